use geo::Rect;

/// Returns the smallest rectangle covering all given rectangles or [`None`]
/// if there are none.
///
/// ```rust
/// use geo::{coord, Rect};
/// use georegions_core::util::bounds::union_of;
///
/// let r = union_of([
///     Rect::new(coord! { x: -10.0, y: 30.0 }, coord! { x: 5.0, y: 45.0 }),
///     Rect::new(coord! { x: 0.0, y: -60.0 }, coord! { x: 40.0, y: 0.0 }),
/// ]);
/// assert_eq!(
///     r,
///     Some(Rect::new(coord! { x: -10.0, y: -60.0 }, coord! { x: 40.0, y: 45.0 }))
/// );
/// ```
pub fn union_of<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| {
        let (a_min, a_max) = (acc.min(), acc.max());
        let (r_min, r_max) = (r.min(), r.max());
        Rect::new(
            (a_min.x.min(r_min.x), a_min.y.min(r_min.y)),
            (a_max.x.max(r_max.x), a_max.y.max(r_max.y)),
        )
    })
}
