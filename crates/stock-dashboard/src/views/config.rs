//! Config view: read-only system configuration with secrets masked

use super::ViewContext;
use crate::formatter::{CONFIG_SECTIONS, display_config_value};
use crate::page::{Block, Page, PageStatus};
use crate::router::View;

#[derive(Debug, Default)]
pub struct ConfigView;

impl ConfigView {
    pub fn new() -> Self {
        Self
    }

    /// Fetch the configuration and render it by section
    pub async fn render(&self, ctx: &ViewContext<'_>) -> Page {
        let page = Page::for_view(View::Config);

        let outcome = ctx
            .call(
                View::Config,
                "正在加载配置...",
                ctx.services.system_config().get_config(true),
            )
            .await;

        let entries = match outcome {
            Ok(Some(snapshot)) => snapshot.config,
            Ok(None) => None,
            Err(err) => return page.fail(format!("加载配置失败: {err}")),
        };

        let Some(entries) = entries else {
            let mut page = page.with_status(PageStatus::NoData);
            page.push(Block::warning("无法加载配置信息"));
            return page;
        };

        let mut page = page.with_status(PageStatus::Success);
        page.push(Block::heading("当前配置"));

        for (section, keys) in CONFIG_SECTIONS {
            let fields: Vec<_> = keys
                .iter()
                .filter_map(|key| {
                    entries
                        .get(*key)
                        .map(|value| Block::field(*key, display_config_value(key, value)))
                })
                .collect();

            page.push(Block::Group {
                title: (*section).to_string(),
                blocks: if fields.is_empty() {
                    Vec::new()
                } else {
                    vec![Block::Fields(fields)]
                },
            });
        }

        page.push(Block::info("⚠️ 配置修改需要在 .env 文件中进行，修改后需要重启应用"));
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::busy::BusyIndicator;
    use crate::collaborators::MockSystemConfigCollaborator;
    use crate::error::DashboardError;
    use crate::models::SystemConfig;
    use crate::page::{Field, Tone};
    use crate::session::Session;
    use crate::session::testing::StubFactory;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn session_with(mock: MockSystemConfigCollaborator) -> Session {
        let factory = StubFactory {
            system_config: Mutex::new(Some(mock)),
            ..Default::default()
        };
        let session = Session::new();
        session.initialize(&factory).unwrap();
        session
    }

    fn section_fields(page: &Page, section: &str) -> Vec<Field> {
        page.blocks
            .iter()
            .find_map(|b| match b {
                Block::Group { title, blocks } if title == section => Some(blocks.clone()),
                _ => None,
            })
            .unwrap()
            .into_iter()
            .flat_map(|b| match b {
                Block::Fields(fields) => fields,
                _ => Vec::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_sections_and_masking() {
        let mut mock = MockSystemConfigCollaborator::new();
        mock.expect_get_config()
            .withf(|include_schema| *include_schema)
            .times(1)
            .returning(|_| {
                let config: BTreeMap<_, _> = [
                    ("openai_api_key".to_string(), json!("sk-1234567890")),
                    ("openai_model".to_string(), json!("gpt-4o-mini")),
                    ("telegram_bot_token".to_string(), json!("")),
                    ("stock_list".to_string(), json!("600519,AAPL")),
                    ("unlisted_key".to_string(), json!("ignored")),
                ]
                .into_iter()
                .collect();
                Ok(Some(SystemConfig {
                    config: Some(config),
                    schema: None,
                }))
            });
        let session = session_with(mock);
        let busy = BusyIndicator::new();
        let ctx = ViewContext::new(session.services().unwrap(), &busy);

        let page = ConfigView::new().render(&ctx).await;
        assert_eq!(page.status, PageStatus::Success);

        let ai = section_fields(&page, "AI 配置");
        assert_eq!(ai.len(), 2);
        assert_eq!(ai[0], Block::field("openai_api_key", "sk-12345..."));
        assert_eq!(ai[1], Block::field("openai_model", "gpt-4o-mini"));

        let notify = section_fields(&page, "通知配置");
        assert_eq!(notify, vec![Block::field("telegram_bot_token", "***")]);

        assert!(section_fields(&page, "数据源配置").is_empty());
        assert_eq!(section_fields(&page, "股票配置")[0].value, "600519,AAPL");
        assert_eq!(page.callouts(Tone::Info).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_config_is_no_data() {
        let mut mock = MockSystemConfigCollaborator::new();
        mock.expect_get_config()
            .times(1)
            .returning(|_| Ok(Some(SystemConfig::default())));
        let session = session_with(mock);
        let busy = BusyIndicator::new();
        let ctx = ViewContext::new(session.services().unwrap(), &busy);

        let page = ConfigView::new().render(&ctx).await;
        assert!(page.is_no_data());
        assert_eq!(page.callouts(Tone::Warning), vec!["无法加载配置信息"]);
    }

    #[tokio::test]
    async fn test_store_failure_renders_error() {
        let mut mock = MockSystemConfigCollaborator::new();
        mock.expect_get_config()
            .times(1)
            .returning(|_| Err(DashboardError::collaborator("permission denied")));
        let session = session_with(mock);
        let busy = BusyIndicator::new();
        let ctx = ViewContext::new(session.services().unwrap(), &busy);

        let page = ConfigView::new().render(&ctx).await;
        assert!(page.is_error());
        assert!(!busy.is_busy());
    }
}
