mod cli;

use clap::Parser;
use cli::Cli;
use cli::Command;
use cli::RunArgs;
use cli::SummaryArgs;
use std::sync::Arc;
use std::time::Duration;
use terrascope_core::AggregationReader;
use terrascope_core::PipelineConfig;
use terrascope_core::PlanPipeline;
use terrascope_core::PlanSummary;
use terrascope_core::TreeCache;
use terrascope_core::pipeline::parse_command_list;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args).await,
        Command::Summary(args) => summary(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let commands = parse_command_list(&args.command);
    anyhow::ensure!(
        !commands.is_empty(),
        "at least one plan command is required"
    );

    let pipeline = PlanPipeline::new(PipelineConfig {
        collector: args.collector,
        commands,
        run_timeout: Duration::from_secs(args.run_timeout),
        clip_last: args.clip_last,
    });

    let stats = pipeline
        .into_dispatcher(args.parallel)
        .dispatch(args.directories)
        .await;

    let durations: Vec<String> = stats.durations.iter().map(|d| format!("{d:?}")).collect();
    println!("Durations: {}", durations.join(" "));
    println!("Total duration {:?}", stats.total);
    println!("Average duration {:?}", stats.average);
    println!("Wall-clock duration {:?}", stats.wall);
    println!("Plans completed {}", stats.completed);

    Ok(())
}

async fn summary(args: SummaryArgs) -> anyhow::Result<()> {
    let cache = Arc::new(TreeCache::new(args.cache_capacity));
    let reader = AggregationReader::new(cache);
    let tree = reader.read_dir(&args.dir).await?;
    print_node(&tree, 0);
    Ok(())
}

fn print_node(node: &PlanSummary, depth: usize) {
    let changes = node.changes();
    let name = node.name();
    let added = changes.resources_added;
    let updated = changes.resources_updated;
    let deleted = changes.resources_deleted;
    let marker = if node.up_to_date() {
        " up-to-date"
    } else {
        ""
    };
    let indent = depth * 2;
    println!("{:indent$}{name} +{added} ~{updated} -{deleted}{marker}", "");

    // Children arrive in completion order; sort for stable output.
    let mut children: Vec<&PlanSummary> = node.children().iter().collect();
    children.sort_by(|a, b| a.name().cmp(b.name()));
    for child in children {
        print_node(child, depth + 1);
    }
}
