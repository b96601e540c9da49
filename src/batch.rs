use crate::config::LaneConfig;
use crate::error::LaneError;
use crate::frontend::SegmentDetector;
use crate::imagery::weighted_overlay;
use crate::lanes::{FrameReport, LaneDetector};
use image::RgbImage;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Also write the blurred, edge, region-of-interest and line-only images.
    pub intermediates: bool,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub output_filepath: Option<PathBuf>,
    pub report: Option<FrameReport>,
    pub error: Option<String>,
}

/// Everything a batch run did, written out by the CLI as JSON on request.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub config: LaneConfig,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub elapsed_seconds: f64,
    pub processed: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

/// Image files directly inside `dir`, sorted by name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, LaneError> {
    let io_error = |source| LaneError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_image {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Processes every image of `input_dir` in parallel and writes the results to
/// `output_dir`. A frame that fails is reported; the others still run.
pub fn process_directory<D: SegmentDetector + Sync>(
    input_dir: &Path,
    output_dir: &Path,
    config: &LaneConfig,
    detector: &D,
    options: BatchOptions,
) -> Result<BatchReport, LaneError> {
    let start_at = Instant::now();
    let paths = list_images(input_dir)?;
    std::fs::create_dir_all(output_dir).map_err(|source| LaneError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    log::info!(
        "processing {} images from {}",
        paths.len(),
        input_dir.display()
    );

    let lanes = LaneDetector::new(config);
    let files: Vec<FileReport> = paths
        .par_iter()
        .map(|path| {
            let file_name = file_name(path);
            match process_file(path, output_dir, config, detector, &lanes, options) {
                Ok((output_filepath, report)) => {
                    log::info!(
                        "{}: {} lines from {} segments",
                        file_name,
                        report.drawn.len(),
                        report.segment_count
                    );
                    FileReport {
                        file_name,
                        output_filepath: Some(output_filepath),
                        report: Some(report),
                        error: None,
                    }
                }
                Err(err) => {
                    log::warn!("skipping {}: {}", file_name, err);
                    FileReport {
                        file_name,
                        output_filepath: None,
                        report: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect();

    let failed = files.iter().filter(|f| f.error.is_some()).count();
    Ok(BatchReport {
        config: config.clone(),
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        elapsed_seconds: start_at.elapsed().as_secs_f64(),
        processed: files.len() - failed,
        failed,
        files,
    })
}

/// Runs one frame through the detector and the lane core, then writes the blended result.
pub fn process_file<D: SegmentDetector>(
    path: &Path,
    output_dir: &Path,
    config: &LaneConfig,
    detector: &D,
    lanes: &LaneDetector,
    options: BatchOptions,
) -> Result<(PathBuf, FrameReport), LaneError> {
    let frame = image::open(path).map_err(image_error(path))?.to_rgb8();
    let name = file_name(path);

    let detection = detector.detect(&frame);
    if options.intermediates {
        for (stage, image) in &detection.stages {
            let stage_path = output_dir.join(format!("{}_{}", stage, name));
            image.save(&stage_path).map_err(image_error(&stage_path))?;
        }
    }

    let mut canvas = RgbImage::new(frame.width(), frame.height());
    let report = lanes.process(&detection.segments, &mut canvas);
    if options.intermediates {
        let lines_path = output_dir.join(format!("hough_lines_{}", name));
        canvas.save(&lines_path).map_err(image_error(&lines_path))?;
    }

    let overlay = &config.overlay;
    let blended = weighted_overlay(&canvas, &frame, overlay.alpha, overlay.beta, overlay.gamma)?;
    let output_filepath = output_dir.join(format!("final_{}", name));
    blended
        .save(&output_filepath)
        .map_err(image_error(&output_filepath))?;

    Ok((output_filepath, report))
}

fn image_error(path: &Path) -> impl FnOnce(image::ImageError) -> LaneError + '_ {
    move |source| LaneError::Image {
        path: path.to_path_buf(),
        source,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontend::Detection;
    use crate::segment::LineSegment;
    use image::Rgb;

    struct FixedSegments(Vec<LineSegment>);

    impl SegmentDetector for FixedSegments {
        fn detect(&self, _frame: &RgbImage) -> Detection {
            Detection {
                segments: self.0.clone(),
                stages: vec![("edges", image::GrayImage::new(4, 4))],
            }
        }
    }

    fn lanes() -> FixedSegments {
        FixedSegments(vec![
            LineSegment::new(100, 100, 60, 140),
            LineSegment::new(150, 100, 190, 140),
        ])
    }

    #[test]
    fn test_list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<_> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(vec!["a.JPG", "b.png"], names);
    }

    #[test]
    fn test_missing_input_dir_is_an_error() {
        let out = tempfile::tempdir().unwrap();
        let result = process_directory(
            Path::new("/definitely/not/here"),
            out.path(),
            &LaneConfig::default(),
            &lanes(),
            BatchOptions::default(),
        );
        assert!(matches!(result, Err(LaneError::Io { .. })));
    }

    #[test]
    fn test_process_directory_writes_outputs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(240, 160, Rgb([40, 40, 40]))
            .save(input.path().join("road.png"))
            .unwrap();
        std::fs::write(input.path().join("broken.png"), b"not a png").unwrap();

        let report = process_directory(
            input.path(),
            output.path(),
            &LaneConfig::default(),
            &lanes(),
            BatchOptions {
                intermediates: true,
            },
        )
        .unwrap();

        assert_eq!(1, report.processed);
        assert_eq!(1, report.failed);
        assert_eq!("broken.png", report.files[0].file_name);
        assert!(report.files[0].error.is_some());

        let road = report.files[1].report.as_ref().unwrap();
        assert_eq!(2, road.drawn.len());
        for name in ["final_road.png", "edges_road.png", "hough_lines_road.png"] {
            assert!(output.path().join(name).is_file(), "missing {}", name);
        }

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("final_road.png"));
    }
}
