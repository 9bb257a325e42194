//! Unified trim of an image sequence.
//!
//! Two passes over the batch:
//!
//! 1. **Measure**: `convert -trim -verbose <in> <scratch>/tmp.png` per image,
//!    the verbose report is parsed into a [`CropGeometry`]
//! 2. **Crop**: one [`UnifiedCrop`] for the whole batch is applied to every
//!    image, together with the background options

use std::{fs, path::PathBuf};

use super::geometry::{CropGeometry, UnifiedCrop, parse_trim_report};
use super::{
    BatchContext, BatchError, BatchReport, BatchResult, Background, TransformOptions, convert_all,
    prepare,
};
use crate::logger::ProgressLine;
use crate::utils::path::ScratchDir;
use crate::utils::plural::plural_count;
use crate::debug;

/// Disposable output of the measure pass.
const MEASURE_FILE: &str = "tmp.png";

/// Crop every image of a batch to one shared window.
///
/// No image is modified unless every image could be measured and the
/// measurements agree on the trimmed size.
pub fn trim(
    ctx: &BatchContext<'_>,
    files: &[PathBuf],
    background: &Background,
    flatten: bool,
) -> BatchResult<BatchReport> {
    // An input named like the measure file is rejected by `prepare`.
    let (files, scratch) = prepare(ctx, files)?;

    let samples = measure(ctx, &files, &scratch)?;
    let crop = UnifiedCrop::from_samples(&samples)?;
    debug!("trim"; "unified crop of {}: {}", plural_count(files.len(), "image"), crop);

    let options = TransformOptions::trim(crop, background, flatten);
    let outputs = convert_all(ctx, "trim", &files, &options, &scratch)?;

    Ok(BatchReport {
        outputs,
        scratch,
        crop: Some(crop),
    })
}

/// Dry-run the trim on every image and collect the reported geometry.
fn measure(
    ctx: &BatchContext<'_>,
    files: &[PathBuf],
    scratch: &ScratchDir,
) -> BatchResult<Vec<(PathBuf, CropGeometry)>> {
    let probe = scratch.join(MEASURE_FILE);
    let mut progress = ProgressLine::new("trim", "measure", files.len());
    let mut samples = Vec::with_capacity(files.len());

    for file in files {
        let cmd = ctx
            .convert()
            .cmd()
            .args(["-trim", "-verbose"])
            .arg(file)
            .arg(&probe);
        let output = ctx.runner.run(&cmd)?;

        let geometry = parse_trim_report(&output).map_err(|source| BatchError::Geometry {
            file: file.clone(),
            source,
        })?;
        debug!("trim"; "{}: {:?}", file.display(), geometry);

        samples.push((file.clone(), geometry));
        progress.inc();
    }
    progress.finish();

    if probe.exists() {
        fs::remove_file(&probe).map_err(|e| BatchError::Io(probe.clone(), e))?;
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{ScriptedRunner, tools};
    use super::*;
    use crate::batch::geometry::{Dimension, ParseError};
    use crate::utils::path::Destination;
    use std::path::Path;
    use tempfile::TempDir;

    const NAMES: [&str; 5] = ["a.png", "b.png", "c.png", "d.png", "e.png"];

    fn frames(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, format!("pixels of {name}")).unwrap();
                path
            })
            .collect()
    }

    fn five_frame_runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .trim_report("a.png", "100x50 640x480+10+20")
            .trim_report("b.png", "102x48 640x480+12+18")
            .trim_report("c.png", "98x50 640x480+7+25")
            .trim_report("d.png", "100x52 640x480+15+20")
            .trim_report("e.png", "101x50 640x480+9+22")
    }

    #[test]
    fn test_trim_five_frames() {
        let dir = TempDir::new().unwrap();
        let files = frames(dir.path(), &NAMES);
        let runner = five_frame_runner();
        let tools = tools();
        let scratch = dir.path().join("scratch");
        let ctx = BatchContext::new(&runner, &tools).with_scratch_dir(Some(scratch.clone()));

        let white = Background::Color("white".into());
        let report = trim(&ctx, &files, &white, false).unwrap();

        // width 102 + (15 - 7), height 52 + (25 - 18), anchored at (7, 18)
        let crop = report.crop.unwrap();
        assert_eq!(
            crop,
            UnifiedCrop {
                width: 110,
                height: 59,
                x: 7,
                y: 18
            }
        );

        let commands = runner.commands();
        assert_eq!(commands.len(), 10);
        for (cmd, file) in commands[..5].iter().zip(&files) {
            assert!(cmd.starts_with("convert -trim -verbose "));
            assert!(cmd.contains(&*file.to_string_lossy()));
            assert!(cmd.ends_with("tmp.png"));
        }
        for cmd in &commands[5..] {
            assert!(cmd.starts_with("convert -crop 110x59+7+18 -background white -alpha remove "));
        }

        assert_eq!(report.outputs, files);
        for (file, name) in files.iter().zip(NAMES) {
            assert_eq!(
                fs::read_to_string(file).unwrap(),
                format!("-crop 110x59+7+18 -background white -alpha remove | pixels of {name}")
            );
        }
        assert!(!scratch.join(MEASURE_FILE).exists());
    }

    #[test]
    fn test_trim_append_with_flatten() {
        let dir = TempDir::new().unwrap();
        let files = frames(dir.path(), &["a.png", "b.png"]);
        let runner = ScriptedRunner::new()
            .trim_report("a.png", "100x50 640x480+0+0")
            .trim_report("b.png", "100x50 640x480-3+0");
        let tools = tools();
        let ctx = BatchContext::new(&runner, &tools)
            .with_scratch_dir(Some(dir.path().join("scratch")))
            .with_destination(Destination::Append("_trimmed".into()));

        let report = trim(&ctx, &files, &Background::Transparent, true).unwrap();

        assert_eq!(report.crop.unwrap().to_string(), "103x50-3+0");
        assert_eq!(
            report.outputs,
            vec![
                dir.path().join("a_trimmed.png"),
                dir.path().join("b_trimmed.png")
            ]
        );
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "pixels of a.png");
        assert_eq!(
            fs::read_to_string(&report.outputs[1]).unwrap(),
            "-crop 103x50-3+0 -background none -flatten | pixels of b.png"
        );
    }

    #[test]
    fn test_trim_keeps_input_named_like_measure_file() {
        let dir = TempDir::new().unwrap();
        let files = frames(dir.path(), &["a.png", MEASURE_FILE]);
        let runner = ScriptedRunner::new()
            .trim_report("a.png", "100x50 640x480+0+0")
            .trim_report(MEASURE_FILE, "100x50 640x480+0+0");
        let tools = tools();
        let ctx = BatchContext::new(&runner, &tools).with_scratch_dir(Some(dir.path().to_path_buf()));

        let err = trim(&ctx, &files, &Background::Transparent, false).unwrap_err();

        assert!(matches!(&err, BatchError::ScratchAliasesInput(_)));
        assert!(runner.commands().is_empty());
        assert_eq!(fs::read_to_string(&files[1]).unwrap(), "pixels of tmp.png");
    }

    #[test]
    fn test_trim_mismatch_modifies_nothing() {
        let dir = TempDir::new().unwrap();
        let files = frames(dir.path(), &["a.png", "b.png", "c.png"]);
        let runner = ScriptedRunner::new()
            .trim_report("a.png", "100x50 640x480+0+0")
            .trim_report("b.png", "100x50 640x480+0+0")
            .trim_report("c.png", "100x50 640x470+0+0");
        let tools = tools();
        let ctx = BatchContext::new(&runner, &tools)
            .with_scratch_dir(Some(dir.path().join("scratch")));

        let err = trim(&ctx, &files, &Background::Transparent, false).unwrap_err();

        let BatchError::GeometryInvariant(mismatch) = &err else {
            panic!("expected invariant error, got {err:?}");
        };
        assert_eq!(mismatch.dimension, Dimension::Height);
        assert_eq!(mismatch.offending.len(), 1);
        assert!(mismatch.offending[0].0.ends_with("c.png"));
        assert!(err.to_string().contains("c.png"));

        // Only the measure pass ran.
        assert_eq!(runner.commands().len(), 3);
        for (file, name) in files.iter().zip(["a.png", "b.png", "c.png"]) {
            assert_eq!(fs::read_to_string(file).unwrap(), format!("pixels of {name}"));
        }
    }

    #[test]
    fn test_trim_unreadable_report_names_file() {
        let dir = TempDir::new().unwrap();
        let files = frames(dir.path(), &["a.png", "b.png"]);
        let runner = ScriptedRunner::new()
            .trim_report("a.png", "100x50 640x480+0+0")
            .report("b.png", "b.png PNG 640x480\nb.png=>tmp.png PNG garbled\n");
        let tools = tools();
        let ctx = BatchContext::new(&runner, &tools)
            .with_scratch_dir(Some(dir.path().join("scratch")));

        let err = trim(&ctx, &files, &Background::Transparent, false).unwrap_err();

        match err {
            BatchError::Geometry { file, source } => {
                assert!(file.ends_with("b.png"));
                assert!(matches!(source, ParseError::NoMatch { .. }));
            }
            other => panic!("expected geometry error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "pixels of a.png");
    }

    #[test]
    fn test_trim_short_report() {
        let dir = TempDir::new().unwrap();
        let files = frames(dir.path(), &["a.png"]);
        let runner = ScriptedRunner::new().report("a.png", "");
        let tools = tools();
        let ctx = BatchContext::new(&runner, &tools)
            .with_scratch_dir(Some(dir.path().join("scratch")));

        let err = trim(&ctx, &files, &Background::Transparent, false).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Geometry {
                source: ParseError::MissingLine { found: 0, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_trim_empty_batch() {
        let runner = ScriptedRunner::new();
        let tools = tools();
        let ctx = BatchContext::new(&runner, &tools);

        let err = trim(&ctx, &[], &Background::Transparent, false).unwrap_err();
        assert!(matches!(err, BatchError::EmptyBatch));
        assert!(runner.commands().is_empty());
    }

    /// Runs the real ImageMagick on synthetic frames.
    #[test]
    #[ignore = "requires ImageMagick `convert` on PATH"]
    fn test_trim_with_imagemagick() {
        use crate::utils::exec::SystemRunner;
        use image::{Rgb, RgbImage};

        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..5u32)
            .map(|i| {
                let (left, top) = (20 + 10 * i, 30 + 5 * i);
                let frame = RgbImage::from_fn(200, 150, |x, y| {
                    let inside = (left..left + 40).contains(&x) && (top..top + 30).contains(&y);
                    if inside { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
                });
                let path = dir.path().join(format!("frame_{i}.png"));
                frame.save(&path).unwrap();
                path
            })
            .collect();

        let tools = tools();
        let ctx = BatchContext::new(&SystemRunner, &tools)
            .with_scratch_dir(Some(dir.path().join("scratch")));
        let white = Background::Color("white".into());

        let report = trim(&ctx, &files, &white, false).unwrap();

        // 40 + (60 - 20) by 30 + (50 - 30)
        assert_eq!(report.crop.unwrap().to_string(), "80x50+20+30");
        for file in &files {
            assert_eq!(image::image_dimensions(file).unwrap(), (80, 50));
        }
    }
}
