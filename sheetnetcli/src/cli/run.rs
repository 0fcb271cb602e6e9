use std::path::{Path, PathBuf};

use colorful::Colorful;

use sheetnetlib::prelude::*;

/// Configuration used when none is given.
pub const DEFAULT_CONFIG: &str = "test.bin";

/// Prints training status reports and snapshots.
struct PrintObserver;

impl TrainingObserver for PrintObserver {
    fn on_status(&mut self, state: &TrainingState) {
        println!("⏳ Iteration {}, error: {}", state.iteration, state.average_error);
    }

    fn on_snapshot(&mut self, iteration: u64, path: &Path, result: &Result<()>) {
        match result {
            Ok(()) => println!("{}", format!("✅ Iteration {iteration}: weights saved to {path:?}").green()),
            Err(err) => eprintln!("{}", format!("🧯 Iteration {iteration}: failed to save weights: {err}").red())
        }
    }
}

pub fn execute(configs: Vec<PathBuf>, seed: Option<u64>) -> anyhow::Result<()> {
    let configs = if configs.is_empty() {
        println!("{} no configuration given, using {}", "📖 Note:".blue(), DEFAULT_CONFIG.yellow());

        vec![PathBuf::from(DEFAULT_CONFIG)]
    } else {
        configs
    };

    for path in configs {
        println!("⏳ Loading configuration {path:?}...");

        let mut config = match Config::load(&path) {
            Ok(config) => config,

            Err(err) => {
                eprintln!("{}", format!("🧯 Failed to load configuration: {err}").red());

                continue;
            }
        };

        if seed.is_some() {
            config.seed = seed;
        }

        tracing::debug!(?path, ?config, "configuration loaded");

        let settings = match Settings::resolve(&config) {
            Ok(settings) => settings,

            Err(err) => {
                eprintln!("{}", format!("🧯 Invalid configuration: {err}").red());

                continue;
            }
        };

        let mut session = match Session::initialize(settings) {
            Ok(session) => session,

            Err(err) => {
                eprintln!("{}", format!("🧯 Failed to initialize network: {err}").red());

                continue;
            }
        };

        for warning in session.warnings() {
            println!("{} {warning}", "📖 Note:".blue());
        }

        echo_settings(&session);

        if session.mode() == Mode::Run && session.settings().print_weights {
            println!("{}", session.network().weights());
        }

        println!("🚀 {} network...", match session.mode() {
            Mode::Train => "Training",
            Mode::Run   => "Running"
        });

        match session.execute(&mut PrintObserver) {
            Ok(report) => print_report(&session, report),
            Err(err) => eprintln!("{}", format!("🧯 Failed to execute network: {err}").red())
        }

        println!();
    }

    Ok(())
}

fn echo_settings(session: &Session) {
    let settings = session.settings();

    println!();
    println!("{}", "Configuration".blue());
    println!("  topology: {}", settings.topology.to_string().yellow());
    println!("  cases: {}", settings.num_cases);

    match &settings.population {
        Population::Random { min, max } => println!("  population: random from [{min}, {max})"),
        Population::File { path, .. } => println!("  population: loaded from {path:?}")
    }

    println!("  activation function: {}", settings.activation);
    println!("  inputs file: {:?}", settings.inputs_file);

    if let Some(outputs) = &settings.outputs_file {
        println!("  expected outputs file: {outputs:?}");
    }

    if settings.train {
        println!();
        println!("{}", "Training".blue());
        println!("  error cutoff: {}", settings.error_cutoff);
        println!("  max iterations: {}", settings.max_iterations);
        println!("  learning rate: {}", settings.learning_rate);
        println!("  keep alive: {}", settings.keep_alive);
        println!("  save weights: {}", settings.save_weights);
        println!("  save interval: {}", settings.save_interval);
        println!("  save to distinct files: {}", settings.save_distinct);

        if settings.save_weights {
            println!("  output weights file: {:?}", settings.output_weights_file);
        }
    }

    if settings.print_weights {
        println!("  {}", "weights will be printed".yellow());
    }

    if session.print_truths() {
        println!("  {}", "truth table will be printed".yellow());
    }

    println!();
}

fn print_report(session: &Session, report: Report) {
    let settings = session.settings();

    if let Some(training) = report.training {
        let mut reasons = Vec::with_capacity(2);

        if training.threshold_hit {
            reasons.push("error threshold reached");
        }

        if training.cap_reached {
            reasons.push("max iterations reached");
        }

        println!("{}", format!("✅ Training terminated: {}", reasons.join(", ")).green());
        println!("  iterations reached: {}", training.iteration);
        println!("  error reached: {}", training.average_error);

        if settings.print_weights {
            println!();
            println!("Final weights:");
            println!("{}", session.network().weights());
        }
    }

    println!("⏳ Time elapsed: {} ms", report.elapsed.as_millis());

    if let Some(path) = &report.saved_weights {
        println!("{}", format!("✅ Weights saved to {path:?}").green());
    }

    if let Some(err) = &report.save_error {
        eprintln!("{}", format!("🧯 Failed to save weights: {err}").red());
    }

    if session.print_truths() {
        if let Some(table) = session.cases().truth_table() {
            println!();
            println!("Truth table (format: | in ... in | out ... out |)");
            print!("{table}");
        }
    }

    if let Some(outputs) = &report.outputs {
        println!();
        println!("Results from running:");

        for (case, outputs) in outputs.iter().enumerate() {
            let outputs = outputs.iter()
                .map(|output| output.to_string())
                .collect::<Vec<_>>();

            println!("  Case {}: {}", case + 1, outputs.join(" "));
        }
    }
}
