use clap::ArgMatches;
use lane_lines::config::LaneConfig;
use lane_lines::error::LaneError;
use lane_lines::imagery::RGB;
use std::path::PathBuf;

mod app;

/// The validated arguments passed in by the user
#[derive(Debug, Clone)]
pub struct Args {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config_filepath: Option<PathBuf>,
    pub data_filepath: Option<PathBuf>,
    pub intermediates: bool,
    pub thickness: Option<u32>,
    pub color: Option<RGB>,
    pub verbosity: u8,
}

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf, LaneError> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| LaneError::InvalidConfig(format!("missing argument '{}'", name)))
}

pub fn parse_args() -> Result<Args, LaneError> {
    from_matches(&app::create().get_matches())
}

fn from_matches(matches: &ArgMatches) -> Result<Args, LaneError> {
    Ok(Args {
        input_dir: required_path(matches, "input_dir")?,
        output_dir: required_path(matches, "output_dir")?,
        config_filepath: matches.get_one::<PathBuf>("config_filepath").cloned(),
        data_filepath: matches.get_one::<PathBuf>("data_filepath").cloned(),
        intermediates: matches.get_flag("intermediates"),
        thickness: matches.get_one::<u32>("thickness").copied(),
        color: matches.get_one::<RGB>("color").copied(),
        verbosity: matches.get_count("verbose"),
    })
}

impl Args {
    /// The config file (or the defaults) with command line overrides applied.
    pub fn config(&self) -> Result<LaneConfig, LaneError> {
        let mut config = match &self.config_filepath {
            Some(path) => LaneConfig::from_json_file(path)?,
            None => LaneConfig::default(),
        };
        if let Some(thickness) = self.thickness {
            config.stroke.thickness = thickness;
        }
        if let Some(color) = self.color {
            config.stroke.color = color;
            config.stroke.left_color = None;
            config.stroke.right_color = None;
        }
        config.validate()?;
        Ok(config)
    }
}
