use std::{
    env,
    fs::{self, File},
    io::{BufReader, Cursor, Read, Seek},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use reqwest::blocking::Client;
use shapefile::{
    dbase::{self, Date, FieldValue},
    PolygonRing, Shape, ShapeReader,
};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::dataset::{FeatureTable, RawDataset, Value};

use super::{FetchError, RemoteResourceReader};

/// Where reference region archives are published
pub const DEFAULT_BASE_URL: &str = "https://github.com/regionmask/regionmask/raw/main/data/";

/// Default HTTP request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the directory inside the user's cache directory
const CACHE_SUBDIR: &str = "georegions";

const USER_AGENT: &str = concat!("georegions/", env!("CARGO_PKG_VERSION"));

/// Name of the pseudo column the dBase reader adds for deleted records
const DELETION_FLAG: &str = "DeletionFlag";

/// Upper bound for buffers preallocated from sizes declared in archives
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// A [`RemoteResourceReader`] for zipped ESRI shapefiles.
///
/// Archives are downloaded once into a cache directory and reused by later
/// runs. The archive must contain exactly one `.shp` file and its `.dbf`
/// attribute table.
#[derive(Debug, Clone)]
pub struct ShapefileArchiveReader {
    base_url: String,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl Default for ShapefileArchiveReader {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: default_cache_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// `$XDG_CACHE_HOME/georegions`, `$HOME/.cache/georegions`, or a directory
/// in the system's temp directory
fn default_cache_dir() -> PathBuf {
    env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
        .unwrap_or_else(env::temp_dir)
        .join(CACHE_SUBDIR)
}

impl ShapefileArchiveReader {
    /// Sets the URL archive names are appended to
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the directory downloaded archives are kept in
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Sets the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the location of the given archive in the cache
    pub fn cached_path(&self, archive: &str) -> PathBuf {
        self.cache_dir.join(archive)
    }

    fn url(&self, archive: &str) -> String {
        format!("{}{}", self.base_url, archive)
    }

    /// Downloads `url` to `target`. The body goes to a `.part` file that is
    /// renamed to `target` once it is complete and opens as a ZIP archive.
    fn download(&self, archive: &str, url: &str, target: &Path) -> Result<(), FetchError> {
        let http_err = |e: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(http_err)?;

        let mut response = client.get(url).send().map_err(http_err)?;
        if !response.status().is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        fs::create_dir_all(&self.cache_dir)?;
        let part = target.with_extension("part");
        let mut file = File::create(&part)?;
        if let Err(e) = response.copy_to(&mut file) {
            drop(file);
            let _ = fs::remove_file(&part);
            return Err(http_err(e));
        }
        file.sync_all()?;
        drop(file);

        if let Err(source) = ZipArchive::new(BufReader::new(File::open(&part)?)) {
            let _ = fs::remove_file(&part);
            return Err(FetchError::Archive {
                archive: archive.to_string(),
                source,
            });
        }

        fs::rename(&part, target)?;
        Ok(())
    }
}

/// Opens the archive at `path` and decodes its shapefile
fn decode(archive: &str, path: &Path) -> Result<FeatureTable, FetchError> {
    let file = File::open(path)?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|source| FetchError::Archive {
        archive: archive.to_string(),
        source,
    })?;

    read_shapefile(&mut zip).map_err(|source| FetchError::Malformed {
        archive: archive.to_string(),
        source,
    })
}

impl RemoteResourceReader for ShapefileArchiveReader {
    type Dataset = FeatureTable;

    fn fetch(&self, archive: &str) -> Result<FeatureTable, FetchError> {
        let path = self.cached_path(archive);
        if path.is_file() {
            debug!(archive, path = %path.display(), "Using cached archive");
        } else {
            let url = self.url(archive);
            info!(archive, %url, "Downloading archive");
            self.download(archive, &url, &path)?;
        }

        match decode(archive, &path) {
            Ok(table) => {
                debug!(archive, rows = table.len(), "Decoded archive");
                Ok(table)
            }
            Err(e @ (FetchError::Archive { .. } | FetchError::Malformed { .. })) => {
                // an unreadable archive must not shadow the next download
                debug!(archive, path = %path.display(), "Removing unreadable archive");
                fs::remove_file(&path)?;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

/// Reads a member of the archive into memory
fn read_member<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = zip
        .by_name(name)
        .with_context(|| format!("Unable to open archive member `{name}'"))?;
    let mut buf = Vec::with_capacity(initial_capacity(file.size()));
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Preallocation for a member whose header declares `declared` bytes. The
/// header is not trusted beyond [`MAX_PREALLOC`].
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared)
        .unwrap_or(MAX_PREALLOC)
        .min(MAX_PREALLOC)
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Locates the shapefile in the archive and converts it into a table
fn read_shapefile<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<FeatureTable> {
    // skip resource forks that macOS puts into archives
    let members = zip
        .file_names()
        .filter(|n| !n.starts_with("__MACOSX"))
        .map(String::from)
        .collect::<Vec<_>>();

    let shp_name = match members
        .iter()
        .filter(|n| has_extension(n, "shp"))
        .collect::<Vec<_>>()
        .as_slice()
    {
        [n] => (*n).clone(),
        [] => bail!("Archive does not contain a `.shp' file"),
        _ => bail!("Archive contains more than one `.shp' file"),
    };

    let stem = &shp_name[..shp_name.len() - ".shp".len()];
    let dbf_name = members
        .iter()
        .find(|n| n.len() == shp_name.len() && n.starts_with(stem) && has_extension(n, "dbf"))
        .cloned()
        .with_context(|| format!("Archive does not contain a `.dbf' file for `{shp_name}'"))?;

    let shp = read_member(zip, &shp_name)?;
    let dbf = read_member(zip, &dbf_name)?;

    let shape_reader = ShapeReader::new(Cursor::new(shp)).context("Invalid `.shp' file")?;
    let dbase_reader = dbase::Reader::new(Cursor::new(dbf)).context("Invalid `.dbf' file")?;
    let columns = dbase_reader
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .filter(|n| n != DELETION_FLAG)
        .collect::<Vec<_>>();

    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);
    let mut builder = FeatureTable::builder(columns.iter().cloned());
    for (i, r) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = r.with_context(|| format!("Unable to read record {i}"))?;
        let geometry =
            shape_to_multi_polygon(shape).with_context(|| format!("Invalid shape in record {i}"))?;
        let values = columns
            .iter()
            .map(|c| record.get(c).map_or(Value::Null, field_to_value))
            .collect();
        builder.push_row(geometry, values)?;
    }

    Ok(builder.build())
}

fn date_to_string(d: &Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())
}

/// Converts a dBase field value into a dataset value
fn field_to_value(v: &FieldValue) -> Value {
    match v {
        FieldValue::Character(s) => s.as_deref().map(str::trim_end).map(String::from).into(),
        FieldValue::Numeric(n) => n.map_or(Value::Null, Value::Float),
        FieldValue::Float(f) => f.map_or(Value::Null, |f| Value::Float(f64::from(f))),
        FieldValue::Integer(i) => Value::Integer(i64::from(*i)),
        FieldValue::Double(d) => Value::Float(*d),
        FieldValue::Currency(c) => Value::Float(*c),
        FieldValue::Memo(m) => Value::String(m.clone()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()).into(),
        FieldValue::Date(d) => d.as_ref().map(date_to_string).into(),
        FieldValue::DateTime(dt) => {
            let time = dt.time();
            Value::String(format!(
                "{}T{:02}:{:02}:{:02}",
                date_to_string(&dt.date()),
                time.hours(),
                time.minutes(),
                time.seconds()
            ))
        }
    }
}

/// Groups polygon rings into polygons. Every outer ring starts a new
/// polygon, inner rings are holes of the preceding outer ring.
fn rings_to_multi_polygon<P>(
    rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> Coord,
) -> Result<MultiPolygon> {
    let mut polygons = Vec::new();
    let mut current: Option<(LineString, Vec<LineString>)> = None;

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some((exterior, holes)) = current.take() {
                    polygons.push(Polygon::new(exterior, holes));
                }
                let exterior = points.iter().map(&xy).collect::<Vec<_>>();
                current = Some((LineString::new(exterior), Vec::new()));
            }
            PolygonRing::Inner(points) => match current.as_mut() {
                Some((_, holes)) => holes.push(LineString::new(points.iter().map(&xy).collect())),
                None => bail!("Inner ring without a preceding outer ring"),
            },
        }
    }

    if let Some((exterior, holes)) = current {
        polygons.push(Polygon::new(exterior, holes));
    }

    Ok(MultiPolygon::new(polygons))
}

fn shape_to_multi_polygon(shape: Shape) -> Result<MultiPolygon> {
    match shape {
        Shape::NullShape => Ok(MultiPolygon::new(Vec::new())),
        Shape::Polygon(p) => rings_to_multi_polygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
        Shape::PolygonM(p) => rings_to_multi_polygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
        Shape::PolygonZ(p) => rings_to_multi_polygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
        _ => bail!("Only polygon shapes are supported"),
    }
}
