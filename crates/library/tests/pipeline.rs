use image::{DynamicImage, Rgb, RgbImage};
use mediaopt_cache::{CacheStore, Fingerprint};
use mediaopt_codec::{Codec, Search, WebpCodec};
use mediaopt_config::Config;
use mediaopt_library::error::ErrorKind;
use mediaopt_library::{Context, Options, Outcome, SkipReason, run};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NO_TARGETS: &[&str] = &[];

/// A throwaway site: `public/media` for assets, `src/content` for Markdown.
struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn media(&self, relative: &str) -> PathBuf {
        self.root().join("public/media").join(relative)
    }

    fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn context(&self, options: Options) -> Context {
        Context::new(self.root(), &Config::default(), options)
    }

    fn cache_path(&self) -> PathBuf {
        self.root().join(".media-optim-cache.json")
    }

    /// Every file under the site with its contents, for before/after
    /// comparisons.
    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        fn visit(dir: &Path, into: &mut BTreeMap<PathBuf, Vec<u8>>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                match path.is_dir() {
                    true => visit(&path, into),
                    false => {
                        into.insert(path.clone(), std::fs::read(&path).unwrap());
                    },
                }
            }
        }
        let mut files = BTreeMap::new();
        visit(self.root(), &mut files);
        files
    }
}

/// A noisy-enough RGB image that WebP can't shrink to nothing.
fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        let seed = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
        Rgb([(x % 256) as u8, (y % 256) as u8, (seed >> 7) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn sample_png_is_converted_and_referenced() {
    let site = Site::new();
    let png = site.write("public/media/sample.png", sample_png(512, 512));
    let post = site.write("src/content/blog/post.md", "# Post\n\n![Sample](/media/sample.png)\n");

    let report = run(&site.context(Options::default()), NO_TARGETS).await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    let Outcome::Optimized { path, output_bytes, renamed, public_path, .. } = &report.outcomes[0] else {
        panic!("expected optimized, got {:?}", report.outcomes[0]);
    };
    let webp = site.media("sample.webp");
    assert!(*renamed);
    assert_eq!(*path, webp);
    assert_eq!(public_path, "/media/sample.webp");
    assert!(*output_bytes <= 2 * 1024 * 1024);
    assert!(webp.exists());
    assert!(!png.exists());
    assert!(std::fs::read(&webp).unwrap().starts_with(b"RIFF"));
    let content = std::fs::read_to_string(&post).unwrap();
    assert!(content.contains("/media/sample.webp"));
    assert!(!content.contains("/media/sample.png"));
    assert_eq!(report.summary.optimized, 1);
}

#[tokio::test]
async fn second_run_is_cached() {
    let site = Site::new();
    site.write("public/media/a.png", sample_png(64, 64));
    site.write("public/media/nested/b.png", sample_png(32, 48));
    let ctx = site.context(Options::default());

    let first = run(&ctx, NO_TARGETS).await.unwrap();
    assert_eq!(first.summary.optimized, 2);
    let persisted = std::fs::read(site.cache_path()).unwrap();

    let second = run(&ctx, NO_TARGETS).await.unwrap();
    assert_eq!(second.summary.skipped, 2);
    assert!(
        second
            .outcomes
            .iter()
            .all(|o| matches!(o, Outcome::Skipped { reason: SkipReason::Cached, .. }))
    );
    assert_eq!(std::fs::read(site.cache_path()).unwrap(), persisted);
}

#[tokio::test]
async fn persisted_cache_matches_files_on_disk() {
    let site = Site::new();
    site.write("public/media/a.png", sample_png(64, 64));
    run(&site.context(Options::default()), NO_TARGETS).await.unwrap();

    let cache = CacheStore::new(site.cache_path()).load().await.unwrap();
    assert_eq!(cache.len(), 1);
    let info = mediaopt_storage::file::stat(&site.media("a.webp")).await.unwrap();
    assert!(cache.is_fresh("/media/a.webp", &Fingerprint::from(&info)));
    assert!(std::fs::read_to_string(site.cache_path()).unwrap().ends_with("}\n"));
}

#[tokio::test]
async fn force_reprocesses_cached_assets() {
    let site = Site::new();
    site.write("public/media/a.png", sample_png(64, 64));
    run(&site.context(Options::default()), NO_TARGETS).await.unwrap();

    let forced = run(&site.context(Options { force: true, dry_run: false }), NO_TARGETS).await.unwrap();
    assert_eq!(forced.outcomes.len(), 1);
    assert!(matches!(forced.outcomes[0], Outcome::Optimized { renamed: false, .. }));
    let info = mediaopt_storage::file::stat(&site.media("a.webp")).await.unwrap();
    assert!(forced.cache.is_fresh("/media/a.webp", &Fingerprint::from(&info)));
}

#[tokio::test]
async fn dry_run_changes_nothing() {
    let site = Site::new();
    site.write("public/media/a.png", sample_png(64, 64));
    site.write("public/media/b.jpg", b"not really a jpeg");
    site.write("src/content/post.md", "![a](/media/a.png)");
    let before = site.snapshot();

    let report = run(&site.context(Options { force: false, dry_run: true }), NO_TARGETS).await.unwrap();

    assert_eq!(report.summary.dry_run, 2);
    assert!(report.outcomes.iter().all(|o| matches!(o, Outcome::DryRun { .. })));
    assert_eq!(site.snapshot(), before);
    assert!(!site.cache_path().exists());
}

#[tokio::test]
async fn explicit_targets_outside_media_root_are_skipped() {
    let site = Site::new();
    let outside = site.write("public/other/a.png", sample_png(16, 16));
    let lookalike = site.write("public/media-old/b.png", sample_png(16, 16));
    let inside = site.write("public/media/c.png", sample_png(16, 16));
    let notes = site.write("public/media/notes.txt", "hello");

    let targets = ["public/other/*.png", "public/media-old/b.png", "public/media/*"];
    let report = run(&site.context(Options::default()), &targets).await.unwrap();

    let by_path: BTreeMap<_, _> = report.outcomes.iter().map(|o| (o.path().to_path_buf(), o)).collect();
    assert!(matches!(by_path[&outside], Outcome::Skipped { reason: SkipReason::OutsideMediaRoot, .. }));
    assert!(matches!(by_path[&lookalike], Outcome::Skipped { reason: SkipReason::OutsideMediaRoot, .. }));
    assert!(matches!(by_path[&notes], Outcome::Skipped { reason: SkipReason::UnsupportedExtension, .. }));
    assert!(matches!(by_path[&site.media("c.webp")], Outcome::Optimized { .. }));
    assert!(outside.exists());
    assert!(lookalike.exists());
    assert!(!inside.exists());
}

#[tokio::test]
async fn broken_image_fails_without_aborting_the_run() {
    let site = Site::new();
    let broken = site.write("public/media/broken.png", b"definitely not a png");
    site.write("public/media/good.png", sample_png(32, 32));

    let report = run(&site.context(Options::default()), NO_TARGETS).await.unwrap();

    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.optimized, 1);
    assert!(broken.exists());
    let cache = CacheStore::new(site.cache_path()).load().await.unwrap();
    assert!(cache.lookup("/media/good.webp").is_some());
    assert!(cache.lookup("/media/broken.png").is_none());
}

#[tokio::test]
async fn over_budget_falls_back_to_floor_quality() {
    let site = Site::new();
    let input = sample_png(128, 128);
    site.write("public/media/a.png", &input);
    let mut ctx = site.context(Options::default());
    ctx.search = Search { max_bytes: 1, ..Search::default() };

    let report = run(&ctx, NO_TARGETS).await.unwrap();

    let Outcome::Optimized { quality, output_bytes, .. } = &report.outcomes[0] else {
        panic!("expected optimized, got {:?}", report.outcomes[0]);
    };
    assert_eq!(*quality, 40);
    let floor = WebpCodec.encode(&input, 40).unwrap();
    assert_eq!(*output_bytes, floor.len() as u64);
    assert_eq!(std::fs::read(site.media("a.webp")).unwrap(), floor);
}

#[tokio::test]
async fn empty_media_root_writes_no_cache() {
    let site = Site::new();
    let report = run(&site.context(Options::default()), NO_TARGETS).await.unwrap();
    assert!(report.outcomes.is_empty());
    assert!(!site.cache_path().exists());
}

#[tokio::test]
async fn corrupt_cache_aborts_the_run() {
    let site = Site::new();
    let png = site.write("public/media/a.png", sample_png(16, 16));
    site.write(".media-optim-cache.json", "{ nope");
    let err = run(&site.context(Options::default()), NO_TARGETS).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Cache));
    assert!(png.exists());
}
