//! Assessment driver: runs the configured filtering strategies over a
//! collection of result lists and reports aggregated quality and timing
//! figures as JSON.

use std::fs::File;
use std::hint::black_box;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use indicatif::ProgressBar;
use log::info;

use attr_filtering::assessment::{write_report, AggregationOutcome, AssessmentRecord};
use attr_filtering::base::{K, ListIndex, MinMax, Score};
use attr_filtering::check::check_solution;
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
#[command(about = "Tests the filtering strategies and prints the performance results")]
struct Args {
    /// The search quality metric to use
    #[arg(short, long, value_enum, default_value = "dcg")]
    metric: MetricName,

    /// Truncate all lists to the first n elements, if n is greater than zero
    #[arg(short = 'n', long, value_delimiter = ',', default_value = "0,10000")]
    n_cut_list: Vec<ListIndex>,

    /// Maximum number of elements to return
    #[arg(short, long, value_delimiter = ',', default_value = "50,100")]
    k_list: Vec<K>,

    /// Target approximation factor
    #[arg(short, long, value_delimiter = ',', default_value = "0.1,0.01")]
    epsilon_list: Vec<Score>,

    /// Skips the lists shorter than n elements
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    skip_shorter_lists: bool,

    /// Number of times each test must be repeated
    #[arg(short = 'r', long, default_value_t = 5)]
    num_runs: u32,

    /// Set the cpu affinity of the process
    #[arg(short = 'a', long, default_value_t = -1, allow_hyphen_values = true)]
    cpu_affinity: i32,

    /// Check all solutions
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    check_solutions: bool,

    /// Show the computation progress
    #[arg(
        short = 'p',
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    show_progress: bool,

    /// Write result to FILE instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Test the cutoff-opt strategy
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    test_cutoff: bool,

    /// Test the topk-opt strategy
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    test_topk: bool,

    /// Test the epsilon filtering strategy
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    test_epsfiltering: bool,

    /// Input files, one result list each; a stream of lists is read from
    /// standard input when no file is given
    files: Vec<PathBuf>,
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

/// Validates and normalizes the cut list: ascending, duplicate-free, the
/// uncut configuration (0) moved to the end so it is processed last.
fn validate_n_cut_list(args: &Args) -> Result<Vec<ListIndex>> {
    if args.n_cut_list.is_empty() {
        bail!("the parameter n-cut-list is empty");
    }
    let mut n_cut_list = args.n_cut_list.clone();
    n_cut_list.sort_unstable();
    if n_cut_list.windows(2).any(|w| w[0] == w[1]) {
        bail!("the parameter n-cut-list contains duplicates");
    }
    if n_cut_list[0] == 0 {
        n_cut_list.rotate_left(1);
    }
    Ok(n_cut_list)
}

fn validate_k_list(args: &Args, n_cut_list: &[ListIndex]) -> Result<Vec<K>> {
    if args.k_list.is_empty() {
        bail!("the parameter k-list is empty");
    }
    let mut k_list = args.k_list.clone();
    k_list.sort_unstable();
    if k_list[0] == 0 {
        bail!("the parameter k-list must contain values strictly greater than 0");
    }
    if k_list.windows(2).any(|w| w[0] == w[1]) {
        bail!("the parameter k-list contains duplicates");
    }
    if n_cut_list[0] > 0 && ListIndex::from(k_list[0]) > n_cut_list[0] {
        bail!("the parameter k-list cannot be greater than n");
    }
    Ok(k_list)
}

fn validate_epsilon_list(args: &Args) -> Result<Vec<Score>> {
    if args.epsilon_list.is_empty() {
        bail!("the parameter epsilon-list is empty");
    }
    let mut epsilon_list = args.epsilon_list.clone();
    epsilon_list.sort_unstable_by(|a, b| b.total_cmp(a));
    if epsilon_list.iter().any(|&e| e <= 0. || e >= 1.) {
        bail!("the parameter epsilon-list must contain values between zero and one");
    }
    if epsilon_list.windows(2).any(|w| w[0] == w[1]) {
        bail!("the parameter epsilon-list contains duplicates");
    }
    Ok(epsilon_list)
}

fn set_cpu_affinity(cpu_affinity: i32) -> Result<()> {
    if cpu_affinity > -1 {
        let core = core_affinity::CoreId {
            id: cpu_affinity as usize,
        };
        if !core_affinity::set_for_current(core) {
            bail!("unable to set the cpu affinity");
        }
    }
    Ok(())
}

/// Per (n_cut, k) running aggregation of every configured strategy.
struct AggregationCell {
    opt: AggregationOutcome,
    strategies: Vec<AggregationOutcome>,
    num_lists_assessed: usize,
    avg_reading_time: f64,
}

fn run<M: SearchQualityMetric>(args: &Args) -> Result<()> {
    let n_cut_list = validate_n_cut_list(args)?;
    let k_list = validate_k_list(args, &n_cut_list)?;
    let epsilon_list = validate_epsilon_list(args)?;
    if args.num_runs == 0 {
        bail!("the parameter num-runs must be a number strictly greater than 0");
    }
    set_cpu_affinity(args.cpu_affinity)?;

    let use_files = !args.files.is_empty();
    for path in &args.files {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("unable to access the stats of the file: {}", path.display()))?;
        if metadata.is_dir() {
            bail!("the following file is a directory: {}", path.display());
        }
    }

    // the discount tables must cover the largest k in use
    let max_k = *k_list.last().expect("validated as non-empty");
    let metric = M::with_max_position(usize::from(max_k));

    // one exact baseline plus the selected strategies, per value of k
    let mut tests_opt = Vec::with_capacity(k_list.len());
    let mut tests_list: Vec<Vec<Composition>> = Vec::with_capacity(k_list.len());
    for &k in &k_list {
        tests_opt.push(Composition::new("OPT", None, k, args.num_runs, 0., 0.)?);

        let mut tests = Vec::new();
        if args.test_cutoff {
            tests.push(Composition::new(
                "Cutoff-OPT",
                Some(Pruner::Cutoff),
                k,
                args.num_runs,
                1.,
                0.,
            )?);
        }
        if args.test_topk {
            tests.push(Composition::new(
                "Topk-OPT",
                Some(Pruner::Topk { k }),
                k,
                args.num_runs,
                0.5,
                0.,
            )?);
        }
        if args.test_epsfiltering {
            for &epsilon in &epsilon_list {
                tests.push(Composition::new(
                    format!("EpsFiltering (epsilon={})", epsilon),
                    Some(Pruner::EpsPruning { k, epsilon }),
                    k,
                    args.num_runs,
                    f64::from(epsilon),
                    0.,
                )?);
            }
        }
        tests_list.push(tests);
    }

    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let num_lists = if use_files {
        args.files.len()
    } else {
        read_count_line(&mut stdin_lock, "lists")?
    };
    info!("assessing {} lists", num_lists);

    let mut cells: Vec<Vec<AggregationCell>> = n_cut_list
        .iter()
        .map(|_| {
            k_list
                .iter()
                .enumerate()
                .map(|(ki, _)| AggregationCell {
                    opt: AggregationOutcome::default(),
                    strategies: vec![AggregationOutcome::default(); tests_list[ki].len()],
                    num_lists_assessed: 0,
                    avg_reading_time: 0.,
                })
                .collect()
        })
        .collect();

    let progress = if args.show_progress {
        ProgressBar::new(num_lists as u64)
    } else {
        ProgressBar::hidden()
    };

    for i in 0..num_lists {
        let results_list: ResultsList = if use_files {
            let path = &args.files[i];
            let file = File::open(path)
                .with_context(|| format!("unable to open the file {}", path.display()))?;
            read_results_list(&mut BufReader::new(file), None)?
        } else {
            let n = read_count_line(&mut stdin_lock, "rows")?;
            read_results_list(&mut stdin_lock, Some(n))?
        };

        for (ni, &n_cut) in n_cut_list.iter().enumerate() {
            let n = if n_cut > 0 {
                results_list.len().min(n_cut as usize)
            } else {
                results_list.len()
            };
            if args.skip_shorter_lists && (n_cut as usize) > n {
                continue;
            }
            if n == 0 {
                continue;
            }
            let rel_list = &results_list.relevances[..n];
            let minmax = MinMax::of(rel_list);

            // cost of traversing the list, the baseline every strategy pays
            let start = Instant::now();
            for _ in 0..args.num_runs {
                for &relevance in rel_list {
                    black_box(relevance);
                }
            }
            let reading_time =
                start.elapsed().as_secs_f64() * 1e3 / f64::from(args.num_runs);

            for (ki, &k) in k_list.iter().enumerate() {
                if n_cut > 0 && ListIndex::from(k) > n_cut {
                    continue;
                }

                let outcome = tests_opt[ki].run(&metric, rel_list, &minmax);
                let optimal_score = outcome.score;

                let cell = &mut cells[ni][ki];
                cell.opt.update(&outcome, cell.num_lists_assessed, None);
                if args.check_solutions {
                    check_solution(
                        rel_list,
                        outcome.score,
                        &outcome.indices,
                        &metric,
                        None,
                        0.,
                        0.,
                    )
                    .with_context(|| {
                        check_context(&tests_opt[ki].name, n_cut, k, use_files, &args.files, i)
                    })?;
                }

                for (j, test) in tests_list[ki].iter().enumerate() {
                    let outcome = test.run(&metric, rel_list, &minmax);
                    cell.strategies[j].update(
                        &outcome,
                        cell.num_lists_assessed,
                        Some(optimal_score),
                    );
                    if args.check_solutions {
                        check_solution(
                            rel_list,
                            outcome.score,
                            &outcome.indices,
                            &metric,
                            Some(optimal_score),
                            test.epsilon_below,
                            test.epsilon_above,
                        )
                        .with_context(|| {
                            check_context(&test.name, n_cut, k, use_files, &args.files, i)
                        })?;
                    }
                }

                let new_multiplier = 1. / (cell.num_lists_assessed as f64 + 1.);
                let old_multiplier = cell.num_lists_assessed as f64 * new_multiplier;
                cell.avg_reading_time =
                    old_multiplier * cell.avg_reading_time + new_multiplier * reading_time;
                cell.num_lists_assessed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let mut records = Vec::new();
    for (ni, &n_cut) in n_cut_list.iter().enumerate() {
        for (ki, &k) in k_list.iter().enumerate() {
            if n_cut > 0 && ListIndex::from(k) > n_cut {
                continue;
            }
            let cell = &cells[ni][ki];
            let mut record = AssessmentRecord::new(n_cut, k);
            record.avg_reading_time = cell.avg_reading_time;
            record.num_lists_assessed = cell.num_lists_assessed;
            record.add_strategy(&tests_opt[ki].name, &cell.opt)?;
            for (j, test) in tests_list[ki].iter().enumerate() {
                record.add_strategy(&test.name, &cell.strategies[j])?;
            }
            records.push(record);
        }
    }

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("unable to open the output file {}", path.display()))?;
            write_report(&mut file, &records)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_report(&mut lock, &records)?;
            lock.flush()?;
        }
    }

    Ok(())
}

fn check_context(
    name: &str,
    n_cut: ListIndex,
    k: K,
    use_files: bool,
    files: &[PathBuf],
    list_index: usize,
) -> String {
    let list = if use_files {
        format!("'{}'", files[list_index].display())
    } else {
        list_index.to_string()
    };
    format!("{} with n={} and k={} on the list {}", name, n_cut, k, list)
}
