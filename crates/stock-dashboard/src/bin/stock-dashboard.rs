//! Stock Dashboard terminal host
//!
//! An interactive terminal front end for the stock analysis dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Point the dashboard at the analysis backend
//! export DASHBOARD_API_BASE="http://127.0.0.1:8000"
//!
//! # Run the dashboard
//! cargo run --bin stock-dashboard -p stock-dashboard
//!
//! # Run a single command and print Markdown
//! cargo run --bin stock-dashboard -- --format markdown -c "/quote 600519"
//! ```

use clap::Parser;
use dashboard_utils::{LogConfig, LogFormat, init_tracing_with};
use stock_dashboard::{
    BusyIndicator, Command, Dashboard, DashboardConfig, HttpServiceFactory, OutputFormat, Page,
    Renderer, RendererFactory,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "stock-dashboard", version, about = "股票智能分析系统 terminal dashboard")]
struct Args {
    /// Output format for rendered pages
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Log filter directive (overridden by RUST_LOG)
    #[arg(long)]
    log_filter: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Debug-level logging for the dashboard
    #[arg(short, long)]
    debug: bool,

    /// Backend base URL (overrides DASHBOARD_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Run one command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                  📈 股票智能分析系统                         ║
║                                                              ║
║  Commands:                                                   ║
║    /view <页面>        - 切换页面 (Switch view)              ║
║    /analyze <code>     - 分析股票 (Analyze)                  ║
║    /history [code]     - 历史记录 (History)                  ║
║    /quote <code>       - 实时行情 (Quote)                    ║
║    /help               - 显示帮助 (Help)                     ║
║    /exit               - 退出 (Exit)                         ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

fn log_config(args: &Args) -> LogConfig {
    let mut config = LogConfig::with_prefix("stock_dashboard").debug(args.debug);
    if let Some(filter) = &args.log_filter {
        config = config.filter(filter.clone());
    }
    if args.log_json {
        config = config.format(LogFormat::Json);
    }
    config
}

fn load_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(base) = &args.api_base {
        config.api_base.clone_from(base);
        config.validate()?;
    }
    Ok(config)
}

/// Spinner line on stderr while a collaborator call is in flight
fn busy_indicator() -> BusyIndicator {
    BusyIndicator::with_listener(|label| {
        let mut stderr = io::stderr();
        let _ = match label {
            Some(label) => write!(stderr, "\r⏳ {label}"),
            None => write!(stderr, "\r\x1b[2K"),
        };
        let _ = stderr.flush();
    })
}

fn print_page(renderer: &dyn Renderer, page: &Page) {
    println!("{}", renderer.render_page(page));
}

/// Run one line of input. Returns `false` when the host should exit.
async fn handle_line(
    dashboard: &mut Dashboard,
    renderer: &dyn Renderer,
    config: &DashboardConfig,
    line: &str,
) -> bool {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("❌ {err}\n");
            return true;
        }
    };

    match command {
        Command::Exit => return false,
        Command::Help => {
            println!("{}", Command::help_text());
            return true;
        }
        _ => {}
    }

    let navigates = matches!(command, Command::View { .. });
    if let Some(action) = command.into_action(config) {
        let page = dashboard.dispatch(action).await;
        if navigates && page.view.is_some() {
            println!("{}", renderer.render_sidebar(&dashboard.sidebar()));
        }
        print_page(renderer, &page);
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing_with(&log_config(&args));

    let config = load_config(&args)?;
    tracing::info!(api_base = %config.api_base, "starting dashboard");

    let renderer = RendererFactory::create(args.format);
    let factory = Arc::new(HttpServiceFactory::new(config.clone()));
    let mut dashboard = Dashboard::with_busy(factory, busy_indicator());

    if let Some(line) = &args.command {
        handle_line(&mut dashboard, renderer.as_ref(), &config, line).await;
        return Ok(());
    }

    if args.format == OutputFormat::Terminal {
        print_banner();
    }

    println!("{}", renderer.render_sidebar(&dashboard.sidebar()));
    let page = dashboard.render().await;
    print_page(renderer.as_ref(), &page);

    // Run REPL
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("[{}] > ", dashboard.current_view().label());
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\n再见!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if !handle_line(&mut dashboard, renderer.as_ref(), &config, input).await {
            println!("再见!");
            break;
        }
    }

    Ok(())
}
