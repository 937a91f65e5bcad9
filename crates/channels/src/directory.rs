use slackmate_core::Result;
use std::future::Future;
use tracing::debug;

use crate::slack::{Page, SlackApi, SlackChannelInfo, SlackUser};

/// Largest page requested from listing endpoints.
pub const PAGE_LIMIT: u32 = 100;

/// Follow `next_cursor` until the platform stops returning one.
///
/// Any page error aborts the walk; nothing partial is returned.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(cursor.take()).await?;
        pages += 1;
        items.extend(page.items);
        match page.next_cursor.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(pages, total = items.len(), "Collected paginated listing");
    Ok(items)
}

pub async fn list_all_channels(slack: &dyn SlackApi) -> Result<Vec<SlackChannelInfo>> {
    collect_pages(move |cursor| async move {
        slack.list_channels_page(cursor.as_deref(), PAGE_LIMIT).await
    })
    .await
}

pub async fn list_all_users(slack: &dyn SlackApi) -> Result<Vec<SlackUser>> {
    collect_pages(move |cursor| async move {
        slack.list_users_page(cursor.as_deref(), PAGE_LIMIT).await
    })
    .await
}

fn normalized(filter: Option<&str>) -> Option<String> {
    filter
        .filter(|f| !f.is_empty())
        .map(|f| f.to_lowercase())
}

/// Case-insensitive substring match on the channel name. Order is preserved.
pub fn filter_channels(channels: Vec<SlackChannelInfo>, filter: Option<&str>) -> Vec<SlackChannelInfo> {
    let Some(needle) = normalized(filter) else {
        return channels;
    };
    channels
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

/// Case-insensitive substring match on the handle or the real name.
pub fn filter_users(users: Vec<SlackUser>, filter: Option<&str>) -> Vec<SlackUser> {
    let Some(needle) = normalized(filter) else {
        return users;
    };
    users
        .into_iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle)
                || u
                    .display_real_name()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .collect()
}
