//! Slash-command parsing for the terminal host
//!
//! Input starting with `/` is a command; anything else is taken as a
//! navigation label, mirroring the single-select navigation control.
//! Short view names are expanded to sidebar labels here, before routing.

use crate::config::DashboardConfig;
use crate::dashboard::Action;
use crate::error::{DashboardError, Result};
use crate::models::ReportType;
use crate::router::View;
use crate::views::{AnalysisForm, HistoryForm};

/// Short names accepted for each view
const VIEW_ALIASES: [(View, &[&str]); 5] = [
    (View::Analysis, &["analysis", "analyze", "分析"]),
    (View::History, &["history", "records", "历史"]),
    (View::Quote, &["quote", "quotes", "market", "行情"]),
    (View::TaskMonitor, &["tasks", "task", "monitor", "任务"]),
    (View::Config, &["config", "settings", "配置"]),
];

/// Sidebar label for a short view name; other input passes through as is
fn view_label(input: &str) -> String {
    let lowered = input.to_lowercase();
    VIEW_ALIASES
        .iter()
        .find(|(_, names)| names.contains(&lowered.as_str()))
        .map_or_else(|| input.to_string(), |(view, _)| view.label().to_string())
}

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch to a view by label
    View { label: String },
    /// Submit a stock for analysis
    Analyze {
        stock_code: String,
        report_type: Option<ReportType>,
        force_refresh: bool,
        notify: bool,
    },
    /// Query analysis history
    History {
        code_filter: String,
        days_back: Option<u32>,
        page_size: Option<u32>,
    },
    /// Open one record of the displayed history page
    Select { index: usize },
    /// Real-time quote
    Quote { stock_code: String },
    /// K-line history for the last quote
    Kline,
    /// Re-render the current view
    Refresh,
    /// Show help
    Help,
    /// Exit the host
    Exit,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(DashboardError::validation("空输入"));
        }

        let Some(body) = input.strip_prefix('/') else {
            return Ok(Command::View {
                label: view_label(input),
            });
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(DashboardError::validation("空命令"));
        };

        match cmd.to_lowercase().as_str() {
            "view" | "v" | "页面" => {
                if args.is_empty() {
                    return Err(DashboardError::validation("请指定页面名称"));
                }
                Ok(Command::View {
                    label: view_label(&args.join(" ")),
                })
            }
            "analyze" | "a" | "分析" => parse_analyze(args),
            "history" | "hist" | "历史" => parse_history(args),
            "select" | "s" | "查看" => {
                let raw = args
                    .first()
                    .ok_or_else(|| DashboardError::validation("请指定记录序号"))?;
                let index = raw
                    .trim_start_matches('#')
                    .parse()
                    .map_err(|_| DashboardError::validation(format!("无效的记录序号: {raw}")))?;
                Ok(Command::Select { index })
            }
            "quote" | "行情" => {
                let code = args
                    .first()
                    .ok_or_else(|| DashboardError::validation("请输入股票代码"))?;
                Ok(Command::Quote {
                    stock_code: (*code).to_string(),
                })
            }
            "kline" | "k" | "k线" => Ok(Command::Kline),
            "refresh" | "r" | "刷新" => Ok(Command::Refresh),
            "tasks" | "任务" => Ok(Command::View {
                label: View::TaskMonitor.label().to_string(),
            }),
            "config" | "配置" => Ok(Command::View {
                label: View::Config.label().to_string(),
            }),
            "help" | "h" | "?" | "帮助" => Ok(Command::Help),
            "exit" | "quit" | "q" | "退出" => Ok(Command::Exit),
            other => Err(DashboardError::validation(format!("未知命令: /{other}"))),
        }
    }

    /// Dashboard action for this command; `None` for host-level commands
    pub fn into_action(self, config: &DashboardConfig) -> Option<Action> {
        match self {
            Command::View { label } => Some(Action::Navigate(label)),
            Command::Analyze {
                stock_code,
                report_type,
                force_refresh,
                notify,
            } => Some(Action::SubmitAnalysis(
                AnalysisForm::new(stock_code)
                    .report_type(report_type.unwrap_or(config.default_report_type))
                    .force_refresh(force_refresh)
                    .notify(notify),
            )),
            Command::History {
                code_filter,
                days_back,
                page_size,
            } => Some(Action::QueryHistory(HistoryForm {
                code_filter,
                days_back: days_back.unwrap_or(config.default_days_back),
                page_size: page_size.unwrap_or(config.default_page_size),
            })),
            Command::Select { index } => Some(Action::SelectHistory(index)),
            Command::Quote { stock_code } => Some(Action::QueryQuote(stock_code)),
            Command::Kline => Some(Action::ShowKline),
            Command::Refresh => Some(Action::Refresh),
            Command::Help | Command::Exit => None,
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
股票智能分析系统 Commands
==========================

Navigation:
  /view <页面>            切换页面 (股票分析/历史记录/股票行情/任务监控/系统配置)
  <页面>                  直接输入页面名称也可切换
  /tasks                  任务监控
  /config                 系统配置
  /refresh                刷新当前页面

Analysis:
  /analyze <code> [simple|detailed] [--force] [--no-notify]
                          分析股票 (Analyze a stock)

History:
  /history [code] [--days 7|30|90|180|365] [--size 10|20|50|100]
                          查询历史记录 (Query history)
  /select <n>             查看第 n 条记录的报告 (Show report inline)

Quote:
  /quote <code>           实时行情 (Real-time quote)
  /kline                  上次查询股票的历史K线 (K-line history)

Other:
  /help                   显示帮助 (Show help)
  /exit                   退出 (Exit)

Aliases:
  /v = /view   /a = /analyze   /hist = /history   /s = /select
  /k = /kline  /r = /refresh   /h = /help         /q = /exit
"
    }
}

fn parse_analyze(args: &[&str]) -> Result<Command> {
    let mut stock_code = None;
    let mut report_type = None;
    let mut force_refresh = false;
    let mut notify = true;

    for arg in args {
        match *arg {
            "--force" | "-f" => force_refresh = true,
            "--no-notify" => notify = false,
            flag if flag.starts_with('-') => {
                return Err(DashboardError::validation(format!("未知选项: {flag}")));
            }
            value if stock_code.is_none() => stock_code = Some(value.to_string()),
            value => report_type = Some(value.parse::<ReportType>()?),
        }
    }

    let stock_code = stock_code.ok_or_else(|| DashboardError::validation("请输入股票代码"))?;
    Ok(Command::Analyze {
        stock_code,
        report_type,
        force_refresh,
        notify,
    })
}

fn parse_history(args: &[&str]) -> Result<Command> {
    let mut code_filter = String::new();
    let mut days_back = None;
    let mut page_size = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--days" | "-d" => days_back = Some(number(arg, iter.next())?),
            "--size" | "-n" => page_size = Some(number(arg, iter.next())?),
            flag if flag.starts_with('-') => {
                return Err(DashboardError::validation(format!("未知选项: {flag}")));
            }
            value => code_filter = value.to_string(),
        }
    }

    Ok(Command::History {
        code_filter,
        days_back,
        page_size,
    })
}

fn number(flag: &str, value: Option<&&str>) -> Result<u32> {
    let value = value.ok_or_else(|| DashboardError::validation(format!("{flag} 需要一个数值")))?;
    value
        .parse()
        .map_err(|_| DashboardError::validation(format!("{flag} 的值无效: {value}")))
}
