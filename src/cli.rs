use clap::{App, AppSettings, Arg, SubCommand};
use slotcar_sim::presets;

pub fn parse_command_line() -> clap::ArgMatches<'static> {
    let track_option = Arg::with_name("track")
        .long("track")
        .short("t")
        .takes_value(true)
        .possible_values(presets::NAMES)
        .conflicts_with("segments")
        .help("Preset circuit [default: round]");

    let segments_option = Arg::with_name("segments")
        .long("segments")
        .short("s")
        .takes_value(true)
        .help("Segment tags, e.g. \"S S < L < L < L < S\"");

    let allow_open_option = Arg::with_name("allow-open")
        .long("allow-open")
        .help("Accept a track whose last piece does not meet the first");

    let rail_option = Arg::with_name("rail")
        .long("rail")
        .short("r")
        .takes_value(true)
        .possible_values(&["inside", "outside"])
        .default_value("inside");

    let simulate_subcommand = SubCommand::with_name("simulate")
        .about("Drives a car round the track at a constant throttle")
        .arg(track_option.clone())
        .arg(segments_option.clone())
        .arg(allow_open_option.clone())
        .arg(rail_option.clone())
        .arg(
            Arg::with_name("throttle")
                .long("throttle")
                .short("T")
                .takes_value(true)
                .default_value("0.3"),
        )
        .arg(
            Arg::with_name("duration")
                .long("duration")
                .short("d")
                .takes_value(true)
                .default_value("10"),
        )
        .arg(
            Arg::with_name("timestep")
                .long("timestep")
                .takes_value(true)
                .default_value("0.01"),
        )
        .arg(
            Arg::with_name("params")
                .long("params")
                .short("p")
                .takes_value(true)
                .help("JSON file of vehicle parameters"),
        );

    let locate_subcommand = SubCommand::with_name("locate")
        .about("Finds the distance along each rail nearest to a point")
        .arg(track_option.clone())
        .arg(segments_option.clone())
        .arg(allow_open_option.clone())
        .arg(Arg::with_name("x").required(true).allow_hyphen_values(true))
        .arg(Arg::with_name("y").required(true).allow_hyphen_values(true))
        .arg(
            Arg::with_name("resolution")
                .long("resolution")
                .takes_value(true)
                .default_value("1.0"),
        )
        .arg(
            Arg::with_name("margin")
                .long("margin")
                .takes_value(true)
                .default_value("20"),
        )
        .arg(
            Arg::with_name("strategy")
                .long("strategy")
                .takes_value(true)
                .possible_values(&["breadth", "nearest"])
                .default_value("breadth"),
        );

    let calibrate_subcommand = SubCommand::with_name("calibrate")
        .about("Fits vehicle parameters to recorded experiments")
        .arg(
            Arg::with_name("dir")
                .required(true)
                .help("Directory of experiment JSON files"),
        )
        .arg(track_option)
        .arg(segments_option)
        .arg(allow_open_option)
        .arg(rail_option)
        .arg(
            Arg::with_name("explore")
                .long("explore")
                .takes_value(true)
                .default_value("10"),
        )
        .arg(
            Arg::with_name("refine")
                .long("refine")
                .takes_value(true)
                .default_value("40"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("42"),
        );

    App::new("slotcar")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(simulate_subcommand)
        .subcommand(locate_subcommand)
        .subcommand(calibrate_subcommand)
        .get_matches()
}
