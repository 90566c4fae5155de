//! Rasterizing the grid and writing PNG files.

use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use image::{ImageFormat, ImageResult, RgbaImage};
use log::{debug, info};

use crate::*;
use crate::coverage::Coverage;

/// Allocates a zeroed canvas, returning an error instead of aborting when
/// memory is not available.
pub fn allocate(width: u32, height: u32) -> Result<RgbaImage> {
    let err = || Error::Allocation {width, height};
    let len = (width as usize).checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(err)?;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| err())?;
    buf.resize(len, 0);
    RgbaImage::from_raw(width, height, buf).ok_or_else(err)
}

fn fill_row(row: &mut [u8], y: u32, cov: &Coverage, settings: &Settings) {
    for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
        let c = cov.at(x as u32, y);
        pixel.copy_from_slice(&settings.background.lerp(settings.foreground, c).to_rgba8());
    }
}

/// Render to image.
///
/// Every pixel gets the background blended with the foreground by the
/// covered area of the grid path, so uncovered pixels are plain background.
/// `progress` receives the finished fraction of rows whenever `report` says so.
pub fn render_to_image<F>(
    settings: &Settings,
    img: &mut RgbaImage,
    report: Report,
    progress: F
) -> Result<()>
    where F: Fn(f64) + Sync
{
    let (w, h) = img.dimensions();
    if w != settings.size || h != settings.size {
        return Err(Error::Config(format!(
            "canvas is {}x{}, expected {}x{}", w, h, settings.size, settings.size
        )));
    }

    let stripes = stripes(settings);
    debug!("filling {} stripes for octaves {}..={}",
        stripes.len(), settings.octaves[0], settings.octaves[1]);
    let cov = Coverage::new(&stripes, settings.size);
    let row_len = w as usize * 4;

    match settings.method {
        RenderMethod::Single => {
            let ref mut rs = report.start();
            for (y, row) in img.chunks_exact_mut(row_len).enumerate() {
                fill_row(row, y as u32, &cov, settings);
                let rows = y as u32 + 1;
                if report.update(rs, rows) {progress(rows as f64 / h as f64)};
            }
        }
        RenderMethod::Parallel => {
            use rayon::prelude::*;

            let done = AtomicU32::new(0);
            let rs = Mutex::new(report.start());
            img.par_chunks_exact_mut(row_len).enumerate().for_each(|(y, row)| {
                fill_row(row, y as u32, &cov, settings);
                let rows = done.fetch_add(1, Ordering::Relaxed) + 1;
                if let Ok(mut rs) = rs.lock() {
                    if report.update(&mut *rs, rows) {progress(rows as f64 / h as f64)};
                }
            });
        }
    }
    Ok(())
}

/// Render to a new image, reporting progress.
pub fn render_with_report<F>(settings: &Settings, report: Report, progress: F) -> Result<RgbaImage>
    where F: Fn(f64) + Sync
{
    settings.validate()?;
    let mut img = allocate(settings.size, settings.size)?;
    render_to_image(settings, &mut img, report, progress)?;
    Ok(img)
}

/// Render to a new image.
pub fn render(settings: &Settings) -> Result<RgbaImage> {
    render_with_report(settings, Report::None, |_| {})
}

/// Encodes image as PNG in memory.
pub fn encode_png(img: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Writes bytes to a temporary file next to `path`, then renames it over `path`.
///
/// An existing file keeps its permissions. A new file gets the mode a plain
/// `File::create` would give it.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".notile").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        // Masked by the umask on creation.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Encodes image as PNG and writes it to file.
///
/// Either the whole file is written or the previous content at `path` is left
/// untouched.
pub fn write_png<P: AsRef<Path>>(img: &RgbaImage, path: P) -> Result<()> {
    let path = path.as_ref();
    let err = |source: io::Error| Error::Write {path: path.to_path_buf(), source};
    let bytes = encode_png(img).map_err(|e| err(io::Error::other(e)))?;
    write_atomic(path, &bytes).map_err(err)?;
    info!("wrote {} ({}x{}, {} bytes)",
        path.display(), img.width(), img.height(), bytes.len());
    Ok(())
}

/// Render to file.
pub fn render_to_file<P: AsRef<Path>>(settings: &Settings, path: P) -> Result<()> {
    let img = render(settings)?;
    write_png(&img, path)
}

/// Render to the output file named by settings.
pub fn generate(settings: &Settings) -> Result<()> {
    render_to_file(settings, &settings.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: [u8; 4] = [32, 32, 32, 255];
    const FG: [u8; 4] = [64, 64, 64, 255];

    #[test]
    fn default_texture() {
        let img = render(&Settings::default()).unwrap();
        assert_eq!(img.dimensions(), (256, 256));
        assert_eq!(img.get_pixel(128, 128).0, FG);
        assert_eq!(img.get_pixel(0, 0).0, FG);
        assert_eq!(img.get_pixel(255, 255).0, FG);
        // Half covered by octave 3 in both directions.
        assert_eq!(img.get_pixel(32, 32).0, [56, 56, 56, 255]);
        // Only the finest lines reach here.
        assert_eq!(img.get_pixel(33, 33).0, [34, 34, 34, 255]);
        assert!(img.pixels().all(|p| p.0[3] == 255));
        assert!(img.pixels().all(|p| p.0[0] >= BG[0] && p.0[0] <= FG[0]));
    }

    #[test]
    fn coarse_only() {
        let settings = Settings {octaves: [1, 1], ..Settings::default()};
        let img = render(&settings).unwrap();
        assert_eq!(img.get_pixel(32, 32).0, BG);
        assert_eq!(img.get_pixel(128, 32).0, FG);
        assert_eq!(img.get_pixel(32, 129).0, FG);
    }

    #[test]
    fn parallel_matches_single() {
        let single = render(&Settings::default()).unwrap();
        let settings = Settings {method: RenderMethod::Parallel, ..Settings::default()};
        let parallel = render(&settings).unwrap();
        assert_eq!(single, parallel);
    }

    #[test]
    fn deterministic_png() {
        let a = encode_png(&render(&Settings::default()).unwrap()).unwrap();
        let b = encode_png(&render(&Settings::default()).unwrap()).unwrap();
        assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(a, b);
    }

    #[test]
    fn progress() {
        let seen = Mutex::new(vec![]);
        render_with_report(&Settings::default(), Report::Row(64), |p| {
            seen.lock().unwrap().push(p);
        }).unwrap();
        assert_eq!(seen.into_inner().unwrap(), vec![0.25, 0.5, 0.75, 1.0]);

        let seen = Mutex::new(vec![]);
        let settings = Settings {method: RenderMethod::Parallel, ..Settings::default()};
        render_with_report(&settings, Report::Row(64), |p| {
            seen.lock().unwrap().push(p);
        }).unwrap();
        let seen = seen.into_inner().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&p| p > 0.0 && p <= 1.0));
    }

    #[test]
    fn allocation_failure() {
        if usize::BITS == 64 {
            assert!(matches!(allocate(u32::MAX, u32::MAX), Err(Error::Allocation {..})));
        }
        assert_eq!(allocate(3, 2).unwrap().dimensions(), (3, 2));
    }

    #[test]
    fn rejects_invalid() {
        let settings = Settings {size: 0, ..Settings::default()};
        assert!(matches!(render(&settings), Err(Error::Config(_))));

        let mut img = RgbaImage::new(16, 16);
        let res = render_to_image(&Settings::default(), &mut img, Report::None, |_| {});
        assert!(matches!(res, Err(Error::Config(_))));
    }
}
