use clap::{command, value_parser, Arg, ArgAction, Command};
use lane_lines::config::MAX_THICKNESS;
use lane_lines::imagery::RGB;
use std::path::PathBuf;

fn thickness(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_THICKNESS).contains(n))
        .ok_or_else(|| {
            format!(
                "Expected an integer from 1 to {} but got \"{}\"",
                MAX_THICKNESS, s
            )
        })
}

pub fn create() -> Command {
    command!()
    .arg(Arg::new("input_dir")
        .value_name("DIRECTORY")
        .short('i')
        .long("input-dir")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Directory of road images to process. Every png, jpg and bmp file directly inside it is used.")
    )
    .arg(Arg::new("output_dir")
        .value_name("DIRECTORY")
        .short('o')
        .long("output-dir")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Directory the annotated images are written to. Created if missing.")
    )
    .arg(Arg::new("config_filepath")
        .value_name("FILEPATH")
        .short('c')
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("JSON file with lane parameters. Missing fields keep their defaults.")
    )
    .arg(Arg::new("data_filepath")
        .value_name("FILEPATH")
        .short('d')
        .long("data-filepath")
        .value_parser(value_parser!(PathBuf))
        .help("Write a JSON report of the run to this file: the config used, and per image the segment counts, lane estimates, drawn lines and errors.")
    )
    .arg(Arg::new("intermediates")
        .long("intermediates")
        .action(ArgAction::SetTrue)
        .help("Also save the blurred, edge, region-of-interest and line-only images of every frame.")
    )
    .arg(Arg::new("thickness")
        .value_name("INTEGER")
        .short('t')
        .long("thickness")
        .value_parser(thickness)
        .help("Stroke thickness of the lane lines in pixels. Overrides the config file.")
    )
    .arg(Arg::new("color")
        .value_name("HEX CODE")
        .long("color")
        .value_parser(|s: &str| s.parse::<RGB>())
        .help("An RGB color in hex format `#RRGGBB` for both lane lines. Overrides the config file.")
    )
    .arg(Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .help("Output debugging messages. Pass multiple times for more verbose logging.")
    )
}
