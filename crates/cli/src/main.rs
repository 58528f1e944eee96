use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polydd::api::HullAlgorithm;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod io;

use io::{emit, load_polyhedron, parse_expression, Coeff, GeneratorDoc, MinimizedDoc};

#[derive(Parser)]
#[command(name = "polydd")]
#[command(about = "Exact polyhedra in double description")]
struct Cmd {
    /// Log debug events of the engine
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print both minimized systems of a polyhedron
    Minimize {
        #[arg(long)]
        input: PathBuf,
        /// Write the JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also remove epsilon-redundant rows (NNC only)
        #[arg(long)]
        strong: bool,
    },
    /// Decide whether x is included in y
    Include {
        #[arg(long)]
        x: PathBuf,
        #[arg(long)]
        y: PathBuf,
    },
    /// Assign the convex hull of x and y if it is exact
    Hull {
        #[arg(long)]
        x: PathBuf,
        #[arg(long)]
        y: PathBuf,
        #[arg(long, value_enum, default_value_t = Algo::Auto)]
        algo: Algo,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Supremum or infimum of a linear expression
    Optimize {
        #[arg(long)]
        input: PathBuf,
        /// `{"coeffs": [..], "inhomogeneous": b}`
        #[arg(long)]
        expr: String,
        /// Maximize instead of minimizing
        #[arg(long)]
        maximize: bool,
    },
    /// Print version information as JSON
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algo {
    Bhz09,
    Bft00,
    Auto,
}

impl From<Algo> for HullAlgorithm {
    fn from(a: Algo) -> Self {
        match a {
            Algo::Bhz09 => HullAlgorithm::Bhz09,
            Algo::Bft00 => HullAlgorithm::Bft00,
            Algo::Auto => HullAlgorithm::Auto,
        }
    }
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    match cmd.action {
        Action::Minimize { input, out, strong } => minimize(&input, out.as_deref(), strong),
        Action::Include { x, y } => include(&x, &y),
        Action::Hull { x, y, algo, out } => hull(&x, &y, algo, out.as_deref()),
        Action::Optimize {
            input,
            expr,
            maximize,
        } => optimize(&input, &expr, maximize),
        Action::Report => report(),
    }
}

fn minimize(input: &Path, out: Option<&Path>, strong: bool) -> Result<()> {
    tracing::info!(input = %input.display(), strong, "minimize");
    let mut p = load_polyhedron(input)?;
    emit(&MinimizedDoc::describe(&mut p, strong), out)
}

fn include(x: &Path, y: &Path) -> Result<()> {
    tracing::info!(x = %x.display(), y = %y.display(), "include");
    let mut px = load_polyhedron(x)?;
    let mut py = load_polyhedron(y)?;
    let included = px.is_included_in(&mut py).context("comparing x and y")?;
    let equal = included && py.is_included_in(&mut px).context("comparing y and x")?;
    emit(&json!({ "included": included, "equal": equal }), None)
}

fn hull(x: &Path, y: &Path, algo: Algo, out: Option<&Path>) -> Result<()> {
    tracing::info!(x = %x.display(), y = %y.display(), algo = ?algo, "hull");
    let mut px = load_polyhedron(x)?;
    let mut py = load_polyhedron(y)?;
    let exact = px
        .poly_hull_assign_if_exact_with(&mut py, algo.into())
        .context("hull exactness")?;
    tracing::info!(exact, "hull verdict");
    let hull = exact.then(|| MinimizedDoc::describe(&mut px, true));
    emit(&json!({ "exact": exact, "hull": hull }), out)
}

fn optimize(input: &Path, expr: &str, maximize: bool) -> Result<()> {
    tracing::info!(input = %input.display(), maximize, "optimize");
    let mut p = load_polyhedron(input)?;
    let e = parse_expression(expr)?;
    let best = if maximize {
        p.maximize(&e)
    } else {
        p.minimize_expr(&e)
    };
    let best = best.context("expression does not fit the polyhedron")?;
    let doc = match best {
        Some(ext) => json!({
            "bounded": true,
            "numerator": Coeff(ext.numerator),
            "denominator": Coeff(ext.denominator),
            "included": ext.included,
            "point": GeneratorDoc::from_generator(&ext.point),
        }),
        None => json!({ "bounded": false, "empty": p.is_empty() }),
    };
    emit(&doc, None)
}

fn report() -> Result<()> {
    let rev = option_env!("GIT_COMMIT").unwrap_or("unknown");
    let obj = json!({
        "name": "polydd",
        "version": polydd::VERSION,
        "code_rev": rev,
        "max_space_dimension": polydd::api::MAX_SPACE_DIMENSION,
    });
    emit(&obj, None)
}

