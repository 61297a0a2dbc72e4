use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::{value_t, ArgMatches};
use slotcar_sim::{
    parse_segments, presets, Calibrator, Experiment, FillStrategy, IndexOptions, LapCounter,
    RasterBounds, SegmentKind, Side, Simulator, SimulatorParams, SpatialIndex, Track, TrackError,
};

mod cli;

fn main() -> Result<()> {
    let matches = cli::parse_command_line();
    match matches.subcommand() {
        ("simulate", Some(m)) => simulate(m),
        ("locate", Some(m)) => locate(m),
        ("calibrate", Some(m)) => calibrate(m),
        _ => unreachable!("clap requires a subcommand"),
    }
}

/// Builds the track named by `--track` or spelled out by `--segments`.
fn load_track(m: &ArgMatches) -> Result<Track> {
    let segments = match m.value_of("segments") {
        Some(text) => parse_segments(text)?,
        None => {
            let name = m.value_of("track").unwrap_or("round");
            presets::by_name(name)
                .ok_or_else(|| anyhow!("unknown track `{}`", name))?
                .to_vec()
        }
    };
    build_track(&segments, m.is_present("allow-open"))
}

/// Builds a track, refusing one that does not close unless `allow_open` is set.
fn build_track(segments: &[SegmentKind], allow_open: bool) -> Result<Track> {
    match Track::closed(segments) {
        Ok(track) => Ok(track),
        Err(err @ TrackError::NotClosed { .. }) if allow_open => {
            eprintln!("warning: {}", err);
            Ok(Track::from_segments(segments))
        }
        Err(err @ TrackError::NotClosed { .. }) => Err(anyhow::Error::new(err)
            .context("pass --allow-open to use a track that does not close")),
        Err(err) => Err(err.into()),
    }
}

fn rail(m: &ArgMatches) -> Result<Side> {
    m.value_of("rail").unwrap_or("inside").parse().map_err(|e: String| anyhow!(e))
}

fn simulate(m: &ArgMatches) -> Result<()> {
    let track = load_track(m)?;
    let side = rail(m)?;
    let throttle = value_t!(m, "throttle", f64)?;
    let duration = value_t!(m, "duration", f64)?;
    let dt = value_t!(m, "timestep", f64)?;
    if dt <= 0.0 {
        bail!("timestep must be positive");
    }
    let params = match m.value_of("params") {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path))?
        }
        None => SimulatorParams::default(),
    };

    let mut sim = Simulator::with_params(&track, side, params);
    let mut laps = LapCounter::new(track.rail_length(side));
    let steps = (duration / dt).round() as usize;
    let report_every = ((1.0 / dt).round() as usize).max(1);

    let layout: String = track.segments().iter().map(|s| s.tag()).collect();
    println!(
        "Simulating {:.1}s on the {:?} rail of {} ({:.1} units) at throttle {:.2}",
        duration,
        side,
        layout,
        track.rail_length(side),
        throttle
    );
    for i in 1..=steps {
        let (crashed, snapshot) = sim.step(throttle, dt);
        if laps.observe(snapshot.rail_distance) {
            println!("  {:7.2}s  lap {}", i as f64 * dt, laps.laps());
        }
        if crashed {
            println!(
                "  {:7.2}s  crashed at {:.1} ({:.1}, {:.1}) doing {:.1}",
                i as f64 * dt,
                snapshot.rail_distance,
                snapshot.position.x,
                snapshot.position.y,
                snapshot.speed
            );
            return Ok(());
        }
        if i % report_every == 0 {
            println!(
                "  {:7.2}s  d = {:6.1}  v = {:6.1}  ahead = [{:+.2}, {:+.2}, {:+.2}]",
                i as f64 * dt,
                snapshot.rail_distance,
                snapshot.speed,
                snapshot.lookahead[0],
                snapshot.lookahead[1],
                snapshot.lookahead[2]
            );
        }
    }
    println!("Completed {} laps without crashing", laps.laps());
    Ok(())
}

fn locate(m: &ArgMatches) -> Result<()> {
    let track = load_track(m)?;
    let x = value_t!(m, "x", f64)?;
    let y = value_t!(m, "y", f64)?;
    let options = IndexOptions {
        resolution: value_t!(m, "resolution", f64)?,
        strategy: match m.value_of("strategy") {
            Some("nearest") => FillStrategy::Nearest,
            _ => FillStrategy::Breadth,
        },
        reach: None,
    };
    let bounds = RasterBounds::around(&track, value_t!(m, "margin", f64)?);
    let index = SpatialIndex::build_with(&track, bounds, options)?;

    for side in Side::ALL {
        match index.query(x, y, side) {
            Some(d) => {
                let p = track.position_at(d, side);
                println!("{:?}: {:.2} (rail point {:.2}, {:.2})", side, d, p.x, p.y);
            }
            None => println!("{:?}: off the map", side),
        }
    }
    Ok(())
}

fn load_experiments(dir: &Path) -> Result<Vec<Experiment>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.retain(|p| p.extension().map_or(false, |ext| ext == "json"));
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let json = fs::read_to_string(path)?;
            Experiment::from_json(&json).with_context(|| format!("loading {}", path.display()))
        })
        .collect()
}

fn calibrate(m: &ArgMatches) -> Result<()> {
    let track = load_track(m)?;
    let side = rail(m)?;
    let dir = m.value_of("dir").unwrap_or(".");
    let experiments = load_experiments(Path::new(dir))?;
    let recorded: f64 = experiments.iter().map(Experiment::duration).sum();
    println!(
        "Loaded {} experiments ({:.1}s recorded) from {}",
        experiments.len(),
        recorded,
        dir
    );

    let fit = Calibrator::new(&track, side, &experiments)?
        .explore(value_t!(m, "explore", usize)?)
        .refine(value_t!(m, "refine", usize)?)
        .seed(value_t!(m, "seed", u64)?)
        .fit()?;
    println!("Best loss: {:.3}", fit.loss);
    println!("{}", serde_json::to_string_pretty(&fit.params)?);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use slotcar_sim::SegmentKind::*;

    #[test]
    fn open_tracks_need_permission() {
        let err = build_track(presets::L_SHAPE, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackError>(),
            Some(TrackError::NotClosed { .. })
        ));

        let track = build_track(presets::L_SHAPE, true).unwrap();
        assert_eq!(track.segments(), presets::L_SHAPE);
        assert!(build_track(presets::ROUND, false).is_ok());
    }

    #[test]
    fn empty_tracks_are_refused_even_when_open_is_allowed() {
        let err = build_track(&[], true).unwrap_err();
        assert!(matches!(err.downcast_ref::<TrackError>(), Some(TrackError::Empty)));
        assert!(build_track(&[Short, Short], true).is_ok());
    }
}
