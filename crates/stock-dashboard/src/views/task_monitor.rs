//! Task monitor view: task queue state grouped by status
//!
//! State is fetched on open and on manual refresh only.

use super::ViewContext;
use crate::formatter::{format_text, group_tasks, task_badge};
use crate::page::{Block, Page, PageStatus};
use crate::router::View;

#[derive(Debug, Default)]
pub struct TaskMonitorView;

impl TaskMonitorView {
    pub fn new() -> Self {
        Self
    }

    /// Fetch the task list and render it
    pub async fn render(&self, ctx: &ViewContext<'_>) -> Page {
        let page = Page::for_view(View::TaskMonitor);
        let limit = ctx.services.config().task_list_limit;

        let outcome = ctx
            .call(
                View::TaskMonitor,
                "正在加载任务列表...",
                ctx.services.task_queue().list_tasks(limit),
            )
            .await;

        let tasks = match outcome {
            Ok(tasks) if tasks.is_empty() => return page.no_data("当前没有任务"),
            Ok(tasks) => tasks,
            Err(err) => return page.fail(format!("获取任务列表失败: {err}")),
        };

        let mut page = page.with_status(PageStatus::Success);
        page.push(Block::success(format!("当前有 {} 个任务", tasks.len())));

        for group in group_tasks(tasks) {
            let mut blocks = Vec::with_capacity(group.tasks.len() * 2);
            for task in &group.tasks {
                blocks.push(Block::Fields(vec![
                    Block::field("股票", format_text(task.stock_code.as_deref())),
                    Block::field("创建时间", format_text(task.created_at.as_deref())),
                ]));
                blocks.push(task_badge(&task.status));
            }
            page.push(Block::Group {
                title: format!("{} ({})", group.status, group.tasks.len()),
                blocks,
            });
        }

        page
    }

    /// Manual refresh; re-fetches the whole list
    pub async fn refresh(&self, ctx: &ViewContext<'_>) -> Page {
        tracing::debug!("task list refresh requested");
        self.render(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::busy::BusyIndicator;
    use crate::collaborators::MockTaskQueueCollaborator;
    use crate::error::DashboardError;
    use crate::models::{Task, TaskStatus};
    use crate::session::Session;
    use crate::session::testing::StubFactory;
    use std::sync::Mutex;

    fn session_with(mock: MockTaskQueueCollaborator) -> Session {
        let factory = StubFactory {
            task_queue: Mutex::new(Some(mock)),
            ..Default::default()
        };
        let session = Session::new();
        session.initialize(&factory).unwrap();
        session
    }

    fn task(code: &str, status: TaskStatus) -> Task {
        Task {
            stock_code: Some(code.to_string()),
            created_at: Some("2024-05-20 09:30:00".to_string()),
            status,
            ..Default::default()
        }
    }

    fn group_titles(page: &Page) -> Vec<String> {
        page.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Group { title, .. } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_groups_in_first_seen_order() {
        let mut mock = MockTaskQueueCollaborator::new();
        mock.expect_list_tasks()
            .withf(|limit| *limit == 50)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    task("600519", TaskStatus::Running),
                    task("AAPL", TaskStatus::Completed),
                    task("00700", TaskStatus::Running),
                    task("TSLA", TaskStatus::Failed),
                ])
            });
        let session = session_with(mock);
        let busy = BusyIndicator::new();
        let ctx = ViewContext::new(session.services().unwrap(), &busy);

        let page = TaskMonitorView::new().render(&ctx).await;

        assert_eq!(page.status, PageStatus::Success);
        assert_eq!(
            group_titles(&page),
            vec!["running (2)", "completed (1)", "failed (1)"]
        );
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let mut mock = MockTaskQueueCollaborator::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_list_tasks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        mock.expect_list_tasks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![task("600519", TaskStatus::Pending)]));
        let session = session_with(mock);
        let busy = BusyIndicator::new();
        let ctx = ViewContext::new(session.services().unwrap(), &busy);

        let view = TaskMonitorView::new();
        assert!(view.render(&ctx).await.is_no_data());

        let page = view.refresh(&ctx).await;
        assert_eq!(group_titles(&page), vec!["pending (1)"]);
    }

    #[tokio::test]
    async fn test_queue_failure_renders_error() {
        let mut mock = MockTaskQueueCollaborator::new();
        mock.expect_list_tasks()
            .times(1)
            .returning(|_| Err(DashboardError::collaborator("queue offline")));
        let session = session_with(mock);
        let busy = BusyIndicator::new();
        let ctx = ViewContext::new(session.services().unwrap(), &busy);

        let page = TaskMonitorView::new().render(&ctx).await;
        assert!(page.is_error());
        assert!(session.is_initialized());
    }
}
