#[macro_use]
extern crate clap;

use std::convert::From;
use std::error::Error;
use std::fmt;
use std::path::Path;

use tikzify::cmap::{CmapError, Palette};
use tikzify::file;
use tikzify::plot::{PlotConfig, PlotKind};
use tikzify::theme::{self, Theme};

#[derive(Debug, Clone)]
enum TikzifyError {
    ArgError(String),
    RunError(String),
}

fn main() -> Result<(), TikzifyError> {
    let yaml = load_yaml!("cli.yml");
    let matches = clap::App::from_yaml(yaml).get_matches();

    run(&matches)
}

fn run<'a>(args: &clap::ArgMatches<'a>) -> Result<(), TikzifyError> {
    if let Some(header_stem) = args.value_of("header") {
        let header_path = format!("{}.tex", header_stem);
        eprintln!("writing TeX preamble include to {} ...", header_path);
        theme::write_header(&header_path)?;

        if !args.is_present("INPUT") {
            return Ok(());
        }
    }

    let style: PlotKind = args
        .value_of("style")
        .unwrap()
        .parse()
        .map_err(|_| TikzifyError::arg_error("unimplemented plot style"))?;

    let map_name = args.value_of("map").unwrap();
    let source = args.value_of("workspace").map(Path::new);

    let map = match Palette::resolve(map_name, source) {
        Ok(m) => m,
        Err(e @ CmapError::UnknownMap(_)) => return Err(TikzifyError::arg_error(e)),
        Err(e) => return Err(TikzifyError::run_error(e)),
    };

    let theme = match args.value_of("theme") {
        None => Theme::simple(),
        Some(p) => match Theme::load(p) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("{}; falling back to the built-in simple theme", e);
                Theme::simple()
            }
        },
    };

    let mut cfg = PlotConfig::default();

    if let Some(l) = args.value_of("xlabel") {
        cfg.x_label = l.to_string();
    }
    if let Some(l) = args.value_of("ylabel") {
        cfg.y_label = l.to_string();
    }
    if let Some(p) = args.value_of("texpath") {
        cfg.tex_path = Some(p.to_string());
    }
    if let Some(s) = args.value_of("imsize") {
        cfg.im_size = s
            .parse()
            .map_err(|_| TikzifyError::arg_error("could not parse image size argument"))?;
    }

    // extra template fields as key=value pairs
    // improper entries don't stop the run but do print warnings
    if let Some(pairs) = args.values_of("set") {
        for s in pairs {
            let mut words = s.splitn(2, '=');
            let key = words.next().expect("unreachable");
            if let Some(value) = words.next() {
                cfg.extra.push((key.to_string(), value.to_string()));
            } else {
                eprintln!(
                    "WARNING: ignoring malformed template field {:?} (want key=value)",
                    s
                );
            }
        }
    }

    let stems: Vec<&str> = args
        .values_of("INPUT")
        .map(|v| v.collect())
        .unwrap_or_default();

    for stem in stems {
        let file_path = format!("{}.npy", stem);

        eprintln!("reading {} ...", file_path);
        let arr = match file::read_array(&file_path) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("skipping {}: {}", file_path, e);
                continue;
            }
        };

        eprintln!("rendering {} ...", stem);
        if let Err(e) = style.render(&arr, stem, &theme, &map, &cfg) {
            eprintln!("skipping {}: {}", stem, e);
            continue;
        }

        eprintln!("finished {}", stem);
    }

    eprintln!("processing complete");

    Ok(())
}

impl TikzifyError {
    fn arg_error<T: fmt::Display>(msg: T) -> Self {
        Self::ArgError(msg.to_string())
    }
    fn run_error<T: fmt::Display>(msg: T) -> Self {
        Self::RunError(msg.to_string())
    }
}

impl<T> From<T> for TikzifyError
where
    T: Error,
{
    fn from(x: T) -> Self {
        TikzifyError::run_error(x.to_string())
    }
}

impl fmt::Display for TikzifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TikzifyError: ")?;
        match self.clone() {
            TikzifyError::ArgError(msg) => {
                write!(f, "argument error: {}", msg)
            }
            TikzifyError::RunError(msg) => {
                write!(f, "runtime error: {}", msg)
            }
        }
    }
}
