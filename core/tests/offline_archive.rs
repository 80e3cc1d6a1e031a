use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    sync::Arc,
};

use assertor::{assert_that, EqualityAssertion, OptionAssertion};
use georegions_core::{
    collection::{Field, RegionCollection, View},
    dataset::RawDataset,
    defined::AR6,
    regions::DatasetRegionBuilder,
    remote::{RemoteResourceReader, ShapefileArchiveReader},
};
use pretty_assertions::assert_eq;
use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Polygon, PolygonRing, Writer,
};
use tempdir::TempDir;
use zip::{write::SimpleFileOptions, ZipWriter};

/// A base URL nothing listens on. Every test must be served from the cache.
const UNREACHABLE: &str = "http://127.0.0.1:9/";

const REGIONS: &[(&str, &str, &str, &str)] = &[
    ("POLAR", "Land", "Greenland/Iceland", "GIC"),
    ("NORTH-AMERICA", "Land", "N.W.North-America", "NWN"),
    ("EUROPE", "Land-Ocean", "Mediterranean", "MED"),
    ("POLAR", "Ocean", "Arctic-Ocean", "ARO"),
    ("OCEAN", "Ocean", "Equatorial.Pacific-Ocean", "EPO"),
];

fn square(x0: f64, y0: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x0, y0 + 10.0),
        Point::new(x0 + 10.0, y0 + 10.0),
        Point::new(x0 + 10.0, y0),
        Point::new(x0, y0),
    ]
}

/// Writes a shapefile with the given regions and packs it into a ZIP
/// archive at `archive`
fn write_archive(archive: &Path) {
    let work = TempDir::new("georegions_shapefile").unwrap();
    let shp = work.path().join("IPCC-WGI-reference-regions-v4.shp");

    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("Continent").unwrap(), 20)
        .add_character_field(FieldName::try_from("Type").unwrap(), 20)
        .add_character_field(FieldName::try_from("Name").unwrap(), 50)
        .add_character_field(FieldName::try_from("Acronym").unwrap(), 10);

    {
        let mut writer = Writer::from_path(&shp, table).unwrap();
        for (i, (continent, ty, name, abbrev)) in REGIONS.iter().enumerate() {
            let polygon = Polygon::new(PolygonRing::Outer(square(i as f64 * 20.0, -5.0)));
            let mut record = Record::default();
            for (k, v) in [
                ("Continent", continent),
                ("Type", ty),
                ("Name", name),
                ("Acronym", abbrev),
            ] {
                record.insert(k.to_string(), FieldValue::Character(Some(v.to_string())));
            }
            writer.write_shape_and_record(&polygon, &record).unwrap();
        }
    }

    let mut zip = ZipWriter::new(File::create(archive).unwrap());
    for ext in ["shp", "shx", "dbf"] {
        let member = shp.with_extension(ext);
        let name = member.file_name().unwrap().to_str().unwrap().to_string();
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&fs::read(&member).unwrap()).unwrap();
    }
    zip.finish().unwrap();
}

fn seeded_reader(cache: &TempDir) -> ShapefileArchiveReader {
    write_archive(&cache.path().join(AR6.archive));
    ShapefileArchiveReader::default()
        .with_base_url(UNREACHABLE)
        .with_cache_dir(cache.path())
}

#[test]
fn reader_decodes_cached_archive() {
    let cache = TempDir::new("georegions_cache").unwrap();
    let reader = seeded_reader(&cache);

    let table = reader.fetch(AR6.archive).unwrap();
    assert_that!(table.len()).is_equal_to(REGIONS.len());
    assert_eq!(
        table.column_names(),
        vec!["Continent", "Type", "Name", "Acronym"]
    );
    assert_eq!(
        table.column_as_strings("Acronym").unwrap(),
        vec!["GIC", "NWN", "MED", "ARO", "EPO"]
    );

    let geometries = table.geometries();
    assert_that!(geometries[0].0.len()).is_equal_to(1);
    assert_that!(geometries[0].0[0].exterior().0.len()).is_equal_to(5);
}

#[test]
fn collection_from_cached_archive() {
    let cache = TempDir::new("georegions_cache").unwrap();
    let ar6 = RegionCollection::new(AR6, seeded_reader(&cache), DatasetRegionBuilder);

    let all = ar6.all().unwrap();
    assert_that!(all.len()).is_equal_to(5);
    assert_that!(all.name()).is_equal_to("AR6 reference regions");

    let land = ar6.land().unwrap();
    assert_eq!(land.abbrevs(), &["GIC", "NWN", "MED"]);
    assert_eq!(land.numbers(), &[0, 1, 2]);
    assert_that!(land.name()).is_equal_to("AR6 reference regions (land only)");

    let ocean = ar6.ocean().unwrap();
    assert_eq!(ocean.abbrevs(), &["MED", "ARO", "EPO"]);
    assert_eq!(ocean.numbers(), &[2, 3, 4]);
    assert_that!(ocean.number_of("Arctic-Ocean")).is_equal_to(Some(3));

    let bounds = all.bounds();
    assert_that!(bounds).is_some();
    let bounds = bounds.unwrap();
    assert_that!(bounds.min().x).is_equal_to(0.0);
    assert_that!(bounds.max().x).is_equal_to(90.0);
    assert_that!(bounds.min().y).is_equal_to(-5.0);
    assert_that!(bounds.max().y).is_equal_to(5.0);

    assert!(Arc::ptr_eq(&land, &ar6.view(View::Land).unwrap()));
    assert!(ar6.is_materialized(Field::Dataset));
}

/// Removing the cached archive after the first fetch must not matter: the
/// dataset is kept in memory for the lifetime of the collection
#[test]
fn dataset_survives_cache_removal() {
    let cache = TempDir::new("georegions_cache").unwrap();
    let ar6 = RegionCollection::new(AR6, seeded_reader(&cache), DatasetRegionBuilder);

    ar6.raw_dataset().unwrap();
    fs::remove_file(cache.path().join(AR6.archive)).unwrap();

    assert_that!(ar6.ocean().unwrap().len()).is_equal_to(3);
    assert_that!(ar6.land().unwrap().len()).is_equal_to(3);
}
