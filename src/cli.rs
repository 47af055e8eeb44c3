// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义参数和子命令
//
// 不带子命令时执行主流程：apod-desktop <image_dir_path> [apod_date]

use crate::store::FileNaming;
use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// 每日天文图片壁纸工具
///
/// 从 NASA APOD 获取指定日期的图片，按内容哈希缓存到本地，
/// 并设置为桌面壁纸。
#[derive(Parser, Debug)]
#[command(name = "apod-desktop")]
#[command(version)]
#[command(about = "Download NASA's Astronomy Picture of the Day and set it as the desktop background")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// 输出更多日志（-v 为 info，-vv 为 debug）
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// 主流程参数
#[derive(clap::Args, Debug, Default)]
pub struct FetchArgs {
    /// 图片保存目录，必须已存在（未指定时使用配置文件中的 image_dir）
    #[arg(value_name = "IMAGE_DIR_PATH")]
    pub image_dir: Option<PathBuf>,

    /// APOD 日期，格式 YYYY-MM-DD，默认今天
    #[arg(value_name = "APOD_DATE")]
    pub date: Option<String>,

    /// 优先下载高清原图
    #[arg(long)]
    pub hd: bool,

    /// 本地文件命名方式 (url / date / hash)
    #[arg(long, value_name = "NAMING")]
    pub naming: Option<FileNaming>,

    /// 只下载并缓存，不设置壁纸
    #[arg(long)]
    pub no_set: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 列出缓存数据库中的图片
    ///
    /// 用法示例:
    ///   apod-desktop list ~/Pictures/apod
    List {
        /// 图片目录（未指定时使用配置文件中的 image_dir）
        #[arg(value_name = "IMAGE_DIR_PATH")]
        image_dir: Option<PathBuf>,
    },

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   apod-desktop config show
    ///   apod-desktop config set api_key YOUR_KEY
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   apod-desktop completions zsh > ~/.zsh/completions/_apod-desktop
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },
}

/// 配置管理操作
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// 查看当前生效的配置
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印配置文件内容
    Dump,
    /// 设置配置项 (api_key, base_url, image_dir, naming, prefer_hd, timeout)
    Set {
        /// 要设置的键
        key: String,
        /// 要设置的值
        value: String,
    },
}
