// main.rs — 程序入口
// 负责初始化日志与多语言、解析命令行参数、分发子命令

mod cache;
mod cli;
mod config;
mod error;
mod pipeline;
mod resolve;
mod setter;
mod source;
mod store;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");

use cache::ImageCache;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, ConfigAction, FetchArgs};
use config::AppConfig;
use error::Result;
use log::{LevelFilter, debug, info};
use pipeline::{FetchOptions, FetchOutcome};
use rust_i18n::t;
use source::ApodSource;
use source::nasa::NasaApodClient;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", t!("error_prefix"), e);
            eprintln!("{}", t!("aborted"));
            ExitCode::FAILURE
        }
    }
}

/// 默认只输出警告；RUST_LOG 环境变量优先
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load()?;

    match cli.command {
        None => {
            let client = NasaApodClient::new(config.api())?;
            let Some(image_path) = handle_fetch(&config, &cli.fetch, &client).await? else {
                return Ok(());
            };

            println!("{}", t!("setting_wallpaper"));
            setter::set_from_path(&image_path)?;
            println!("{}", t!("set_done"));
        }
        Some(Commands::List { image_dir }) => {
            handle_list(&config, image_dir)?;
        }
        Some(Commands::Config { action }) => {
            handle_config(&mut config, &action)?;
        }
        Some(Commands::Completions { shell }) => {
            generate(
                shell,
                &mut Cli::command(),
                "apod-desktop",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// 主流程：校验参数、获取并缓存图片
///
/// 返回需要设置为壁纸的图片路径；指定 --no-set 时返回 None。
/// 所有参数校验都在发出网络请求之前完成。
async fn handle_fetch(
    config: &AppConfig,
    args: &FetchArgs,
    source: &(dyn ApodSource + Sync),
) -> Result<Option<PathBuf>> {
    let configured_dir = config.image_dir();
    let image_dir = resolve::resolve_image_dir(args.image_dir.as_deref(), configured_dir.as_deref())?;
    println!("{}", t!("image_dir", path => image_dir.display()));

    let date = resolve::resolve_apod_date(args.date.as_deref(), resolve::today())?;
    println!("{}", t!("apod_date", date => date));

    let cache = ImageCache::open_in_dir(&image_dir)?;

    let options = FetchOptions {
        prefer_hd: args.hd || config.prefer_hd(),
        naming: args.naming.unwrap_or_else(|| config.naming()),
    };
    debug!("fetch options: {:?}", options);

    println!("{}", t!("fetch_start"));
    let outcome = pipeline::fetch_and_cache(source, &cache, &image_dir, date, options).await?;
    print_apod_info(&outcome);

    if args.no_set {
        return Ok(None);
    }
    Ok(Some(outcome.image.local_path))
}

/// 打印本次 APOD 的信息
fn print_apod_info(outcome: &FetchOutcome) {
    if let Some(title) = &outcome.info.title {
        println!("{}", t!("info_title", title => title));
    }
    if let Some(copyright) = &outcome.info.copyright {
        println!("{}", t!("info_copyright", copyright => copyright.trim()));
    }
    if let Some(explanation) = &outcome.info.explanation {
        info!("{}", explanation);
    }
    let image = &outcome.image;
    println!("{}", t!("info_url", url => image.source_url));
    println!("{}", t!("info_path", path => image.local_path.display()));
    println!("{}", t!("info_size", size => image.size_bytes));
    println!("{}", t!("info_sha256", hash => image.content_hash));

    if outcome.newly_cached {
        println!("{}", t!("cache_added"));
    } else {
        println!("{}", t!("cache_hit"));
    }
}

/// 处理 list 子命令：列出缓存中的图片
fn handle_list(config: &AppConfig, image_dir: Option<PathBuf>) -> Result<()> {
    let configured_dir = config.image_dir();
    let dir = resolve::resolve_image_dir(image_dir.as_deref(), configured_dir.as_deref())?;
    let cache = ImageCache::open_in_dir(&dir)?;
    let images = cache.list_images()?;

    if images.is_empty() {
        println!("{}", t!("list_empty"));
        return Ok(());
    }

    println!("{}", t!("list_title", count => images.len()));
    println!("{}", "-".repeat(30));
    for image in &images {
        let date = image.apod_date.as_deref().unwrap_or("----------");
        println!(
            "  {}  {}  {:>10}  {}",
            date,
            &image.content_hash[..12.min(image.content_hash.len())],
            image.size_bytes,
            image.local_path.display()
        );
    }
    Ok(())
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(config: &mut AppConfig, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let api = config.api();
            println!("{}", t!("config_title"));
            println!("{}", t!("config_path", path => config.config_path.display()));
            let dir = config
                .image_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "None".to_string());
            println!("{}", t!("config_image_dir", path => dir));
            println!("{}", t!("config_naming", naming => config.naming()));
            println!("{}", t!("config_prefer_hd", hd => config.prefer_hd()));
            println!("{}", t!("config_base_url", url => api.base_url));
            println!("{}", t!("config_api_key", key => config::mask_key(&api.api_key)));
            println!("{}", t!("config_timeout", secs => api.timeout_secs));
        }
        ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema());
        }
        ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            config.save()?;
            println!("{}", t!("config_updated", key => key, value => value));
        }
    }
    Ok(())
}
