use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use evalmatrix::{
    group_breakdown, Config, Dashboard, DashboardReport, FilterSet, ReportBody, Selection,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "evalmatrix")]
#[command(author, version, about = "Filter and summarize evaluation-matrix workbooks")]
struct Args {
    /// Config file (default: nearest .evalmatrix/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dashboard profile to use (default: config's default_dashboard)
    #[arg(short, long, global = true)]
    dashboard: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured dashboards
    Dashboards,

    /// Show the distinct dimensions and subdimensions
    Options,

    /// Show the entities the workbook scores
    Entities,

    /// Build a report for a selection
    Report {
        /// Keep rows in this dimension (repeatable)
        #[arg(long = "dimension")]
        dimensions: Vec<String>,

        /// Keep rows in this subdimension (repeatable)
        #[arg(long = "subdimension")]
        subdimensions: Vec<String>,

        /// Entity to report on (omit for the cross-entity overview)
        #[arg(short, long)]
        entity: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API
    Serve {
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing();

    if let Err(e) = run(args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> evalmatrix::Result<()> {
    if let Command::Completion { shell } = args.command {
        clap_complete::generate(shell, &mut Args::command(), "evalmatrix", &mut io::stdout());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };

    match args.command {
        Command::Dashboards => {
            for profile in &config.dashboards {
                let marker = if profile.name == config.default_dashboard {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {}",
                    marker,
                    profile.name.bold(),
                    profile.display_title().dimmed()
                );
                println!("    {}", config.resolve_path(&profile.path).display());
                if let Some(entity) = &profile.pinned_entity {
                    println!("    pinned: {}", entity);
                }
            }
        }

        Command::Options => {
            let dashboard = Dashboard::from_config(&config, args.dashboard.as_deref())?;
            let options = dashboard.filter_options()?;
            println!("{}", "Dimensions".bold());
            for dimension in &options.dimensions {
                println!("  {}", dimension);
            }
            println!("{}", "Subdimensions".bold());
            for subdimension in &options.subdimensions {
                println!("  {}", subdimension);
            }
        }

        Command::Entities => {
            let dashboard = Dashboard::from_config(&config, args.dashboard.as_deref())?;
            for entity in dashboard.entities()? {
                println!("{}", entity);
            }
        }

        Command::Report {
            dimensions,
            subdimensions,
            entity,
            json,
        } => {
            let dashboard = Dashboard::from_config(&config, args.dashboard.as_deref())?;
            let selection = Selection {
                filters: FilterSet::new(dimensions, subdimensions),
                entity,
            };
            let report = dashboard.report(&selection)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Command::Serve { port } => {
            evalmatrix::serve::start(config, port)?;
        }

        Command::Completion { .. } => {}
    }

    Ok(())
}

fn print_report(report: &DashboardReport) {
    if let Some(title) = &report.title {
        println!("{}", title.bold().green());
    }
    println!("{}", report.source.dimmed());
    println!();

    for kpi in &report.kpis {
        println!("  {:<22} {}", kpi.label, kpi.value.bold());
    }
    println!();

    match &report.body {
        ReportBody::Entity {
            entity,
            breakdown,
            table,
            ..
        } => {
            println!("{} {}", "Entity:".bold(), entity.cyan());

            let grouped = group_breakdown(breakdown);
            if !grouped.is_empty() {
                println!("\n{}", "Point Sum by Subdimension".bold());
                for point in &grouped {
                    println!("  {:<40} {}", point.label, point.value);
                }
            }

            println!("\n{} ({} rows)", "Details".bold(), table.rows.len());
            println!("{}", table.columns.join("\t").dimmed());
            for row in &table.rows {
                let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
                println!("{}", cells.join("\t"));
            }
        }
        ReportBody::Overview { comparison, .. } => {
            println!("{}", "Points by Entity".bold());
            if comparison.is_empty() {
                println!("  {}", "no entity has a Points column".yellow());
            }
            for entry in comparison {
                println!("  {:<22} {}", entry.entity, entry.points_sum);
            }
        }
    }
}
