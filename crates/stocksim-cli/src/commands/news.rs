use serde::Serialize;
use stocksim_core::{News, NewsDraft};

use crate::cli::{NewsListArgs, NewsPublishArgs};
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct NewsResponseData<'a> {
    news: &'a [News],
}

fn news_table<'a>(items: impl IntoIterator<Item = &'a News>) -> Table {
    let mut table = Table::new(vec!["id", "timestamp", "impact", "category", "headline"]);
    for item in items {
        table.push(vec![
            item.id.to_string(),
            item.timestamp.to_string(),
            item.impact.get().to_string(),
            item.category.clone(),
            item.headline.clone(),
        ]);
    }
    table
}

pub fn list(args: &NewsListArgs, session: &Session) -> Result<CommandResult, CliError> {
    let all = session.market.news();
    let news = &all[..args.limit.min(all.len())];
    Ok(CommandResult::ok(serde_json::to_value(NewsResponseData { news })?)
        .with_table(news_table(news)))
}

pub fn publish(args: &NewsPublishArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let draft = NewsDraft::new(
        args.headline.clone(),
        args.impact,
        args.category.clone(),
        args.published_by.clone(),
    );
    let item = session.market.publish_news(draft)?;
    Ok(CommandResult::ok(serde_json::to_value(&item)?).with_table(news_table([&item])))
}
