use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use utorrent::{AddTorrentOptions, Config, TorrentSource, UtClient};

const USAGE: &str = "usage: utorrent [config.toml] <list|get|settings|version|add|remove|pause|unpause|start|stop|forcestart|queueup|queuedown|queuetop|queuebottom> [args]";

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,reqwest=warn");
    }
    pretty_env_logger::init_timed();

    let mut args = std::env::args().skip(1).peekable();
    let config_path = match args.peek() {
        Some(arg) if arg.ends_with(".toml") => args.next().unwrap_or_default(),
        _ => "config.toml".to_string(),
    };
    let config = Config::load(&PathBuf::from(config_path)).await?;
    let client = UtClient::new(config).context("failed to build client")?;

    let command = args.next().context(USAGE)?;
    let arg = args.next();
    let hash = || arg.clone().context("missing torrent hash");

    match command.as_str() {
        "list" => print(&client.get_all_data().await?.torrents)?,
        "get" => print(&client.get_torrent(&hash()?).await?)?,
        "settings" => print(&client.get_settings().await?)?,
        "version" => print(&client.get_version().await?)?,
        "add" => {
            let target = arg.clone().context("missing torrent path or magnet")?;
            let source = if torrent_meta::is_magnet(&target) {
                TorrentSource::Magnet(target)
            } else {
                TorrentSource::from(PathBuf::from(target))
            };
            let options = AddTorrentOptions {
                start_paused: false,
                label: args.next(),
            };
            print(&client.normalized_add_torrent(source, options).await?)?
        }
        "remove" => print(&client.remove_torrent(&hash()?, false).await?)?,
        "pause" => print(&client.pause_torrent(&hash()?).await?)?,
        "unpause" => print(&client.unpause(&hash()?).await?)?,
        "start" => print(&client.start_torrent(&hash()?).await?)?,
        "stop" => print(&client.stop_torrent(&hash()?).await?)?,
        "forcestart" => print(&client.force_start_torrent(&hash()?).await?)?,
        "queueup" => print(&client.queue_up(&hash()?).await?)?,
        "queuedown" => print(&client.queue_down(&hash()?).await?)?,
        "queuetop" => print(&client.queue_top(&hash()?).await?)?,
        "queuebottom" => print(&client.queue_bottom(&hash()?).await?)?,
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}
