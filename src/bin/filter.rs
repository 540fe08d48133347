//! Filter driver: applies one filtering strategy to a single result list and
//! prints the ids of the selected results, one per line.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use attr_filtering::base::{K, ListIndex, MinMax, Score};
use attr_filtering::composition::Composition;
use attr_filtering::metric::{Dcg, DcgLz, SearchQualityMetric};
use attr_filtering::pruner::Pruner;
use attr_filtering::reader::{read_count_line, read_results_list, ResultsList};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MetricName {
    Dcg,
    Dcglz,
}

#[derive(Parser, Debug)]
#[command(
    about = "Applies a filtering strategy to the input data and prints the list of ids to select"
)]
struct Args {
    /// The search quality metric to use
    #[arg(short, long, value_enum, default_value = "dcg")]
    metric: MetricName,

    /// Truncate the list to the first n elements, if n is greater than zero
    #[arg(short, long, default_value_t = 0)]
    n_cut: ListIndex,

    /// Maximum number of elements to return
    #[arg(short, default_value_t = 50)]
    k: K,

    /// Target approximation factor
    #[arg(short, long, default_value_t = 0.01)]
    epsilon: Score,

    /// Set the cpu affinity of the process
    #[arg(short = 'a', long, default_value_t = -1, allow_hyphen_values = true)]
    cpu_affinity: i32,

    /// Write result to FILE instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use the cutoff-opt strategy
    #[arg(long)]
    test_cutoff: bool,

    /// Use the topk-opt strategy
    #[arg(long)]
    test_topk: bool,

    /// Use the epsilon filtering strategy
    #[arg(long)]
    test_epsfiltering: bool,

    /// Input file holding one result list; read from standard input when
    /// absent
    file: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let status = match args.metric {
        MetricName::Dcg => run::<Dcg>(&args),
        MetricName::Dcglz => run::<DcgLz>(&args),
    };
    if let Err(err) = status {
        eprintln!("{:#}.", err);
        std::process::exit(-1);
    }
}

fn select_composition(args: &Args) -> Result<Composition> {
    let selected =
        u32::from(args.test_cutoff) + u32::from(args.test_topk) + u32::from(args.test_epsfiltering);
    if selected > 1 {
        bail!("unable to select more than one test at a time");
    }

    let composition = if args.test_cutoff {
        Composition::new("Cutoff-OPT", Some(Pruner::Cutoff), args.k, 1, 1., 0.)?
    } else if args.test_topk {
        Composition::new("Topk-OPT", Some(Pruner::Topk { k: args.k }), args.k, 1, 0.5, 0.)?
    } else if args.test_epsfiltering {
        if args.epsilon <= 0. || args.epsilon >= 1. {
            bail!("the parameter epsilon must be between zero and one");
        }
        Composition::new(
            format!("EpsFiltering (epsilon={})", args.epsilon),
            Some(Pruner::EpsPruning {
                k: args.k,
                epsilon: args.epsilon,
            }),
            args.k,
            1,
            f64::from(args.epsilon),
            0.,
        )?
    } else {
        Composition::new("OPT", None, args.k, 1, 0., 0.)?
    };
    Ok(composition)
}

fn run<M: SearchQualityMetric>(args: &Args) -> Result<()> {
    if args.k == 0 {
        bail!("the parameter k must be strictly greater than 0");
    }
    if args.n_cut > 0 && args.n_cut < ListIndex::from(args.k) {
        bail!("the parameter n-cut is smaller than the parameter k");
    }
    if args.cpu_affinity > -1 {
        let core = core_affinity::CoreId {
            id: args.cpu_affinity as usize,
        };
        if !core_affinity::set_for_current(core) {
            bail!("unable to set the cpu affinity");
        }
    }

    let metric = M::with_max_position(usize::from(args.k));
    let composition = select_composition(args)?;

    let results_list: ResultsList = match &args.file {
        Some(path) => {
            let metadata = std::fs::metadata(path).with_context(|| {
                format!("unable to access the stats of the file: {}", path.display())
            })?;
            if metadata.is_dir() {
                bail!("the following file is a directory: {}", path.display());
            }
            let file = File::open(path)
                .with_context(|| format!("unable to open the file {}", path.display()))?;
            read_results_list(&mut BufReader::new(file), None)?
        }
        None => {
            let stdin = io::stdin();
            let mut lock = stdin.lock();
            let n = read_count_line(&mut lock, "rows")?;
            read_results_list(&mut lock, Some(n))?
        }
    };

    let n = if args.n_cut > 0 {
        results_list.len().min(args.n_cut as usize)
    } else {
        results_list.len()
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("unable to open the output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    if n > 0 {
        let rel_list = &results_list.relevances[..n];
        let minmax = MinMax::of(rel_list);
        let outcome = composition.run(&metric, rel_list, &minmax);
        for &ix in &outcome.indices {
            writeln!(out, "{}", results_list.ids[ix as usize])?;
        }
    }
    out.flush()?;

    Ok(())
}
