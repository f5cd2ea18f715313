//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、日志初始化与依赖注入。

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use submerge::core::config::AppConfig;
use submerge::interfaces::DecodeConfig;
use submerge::model::{
    BuildRequest, ClashFlavor, NodeList, Replacement, RuleInsertion, RuleProviderInsertion, SortMode,
};
use submerge::network::HttpFetcher;
use submerge::{DecoderRegistry, SubscriptionAssembler};

/// 命令行界面脚手架 (CLI Scaffolding)
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成完整的 Clash 配置
    Build(BuildArgs),
    /// 解码分享链接并输出节点 YAML
    Decode {
        #[arg(required = true)]
        links: Vec<String>,
        #[arg(long)]
        udp: bool,
    },
    /// 将分享链接重新编码为规范形式
    Encode {
        #[arg(required = true)]
        links: Vec<String>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// 目标内核 (clash | meta)
    #[arg(short, long, default_value = "meta", value_parser = ClashFlavor::from_str)]
    target: ClashFlavor,
    /// 订阅地址，可附带 `#标签`
    #[arg(short, long = "sub")]
    subs: Vec<String>,
    /// 内联分享链接
    #[arg(short, long = "proxy")]
    proxies: Vec<String>,
    /// 模板路径、URL 或别名
    #[arg(long)]
    template: Option<String>,
    /// 删除名称匹配该正则的节点
    #[arg(long)]
    remove: Option<String>,
    /// 名称替换 (PATTERN=TO)
    #[arg(long = "replace", value_parser = parse_key_val)]
    replacements: Vec<(String, String)>,
    /// 追加规则 (位于 MATCH 之前)
    #[arg(long = "rule")]
    rules: Vec<String>,
    /// 前插规则
    #[arg(long = "prepend-rule")]
    prepend_rules: Vec<String>,
    /// 规则集 (behavior,url,group[,prepend[,name]])
    #[arg(long = "rule-provider", value_parser = parse_rule_provider)]
    rule_providers: Vec<RuleProviderInsertion>,
    /// 策略组排序 (name-asc | name-desc | size-asc | size-desc)
    #[arg(long, default_value = "name-asc", value_parser = SortMode::from_str)]
    sort: SortMode,
    #[arg(long)]
    auto_test: bool,
    #[arg(long)]
    lazy: bool,
    #[arg(long)]
    ignore_country_group: bool,
    #[arg(long)]
    udp: bool,
    /// 跳过缓存，强制重新获取订阅
    #[arg(long)]
    refresh: bool,
    #[arg(long)]
    user_agent: Option<String>,
    /// 仅输出节点列表
    #[arg(long)]
    node_list: bool,
    /// 输出文件，缺省写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl BuildArgs {
    fn to_request(&self) -> BuildRequest {
        let rules = self
            .prepend_rules
            .iter()
            .map(|rule| RuleInsertion { rule: rule.clone(), prepend: true })
            .chain(self.rules.iter().map(|rule| RuleInsertion { rule: rule.clone(), prepend: false }))
            .collect();
        let replacements = self
            .replacements
            .iter()
            .map(|(pattern, to)| Replacement { pattern: pattern.clone(), to: to.clone() })
            .collect();

        BuildRequest::builder()
            .subs(self.subs.clone())
            .proxies(self.proxies.clone())
            .maybe_template(self.template.clone())
            .maybe_remove(self.remove.clone())
            .replacements(replacements)
            .rules(rules)
            .rule_providers(self.rule_providers.clone())
            .sort(self.sort)
            .auto_test(self.auto_test)
            .lazy(self.lazy)
            .ignore_country_group(self.ignore_country_group)
            .use_udp(self.udp)
            .refresh(self.refresh)
            .maybe_user_agent(self.user_agent.clone())
            .node_list(self.node_list)
            .build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load(&cli.config)?);

    // 日志初始化：RUST_LOG 优先，其次配置文件
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true)
        .init();

    let registry = Arc::new(DecoderRegistry::new());

    match cli.command {
        Commands::Build(args) => {
            let loader = Arc::new(HttpFetcher::new(config.clone())?);
            let assembler = SubscriptionAssembler::new(registry, loader, config.clone());
            let req = args.to_request();

            let yaml = assembler.render(args.target, &req).await?;
            match &args.output {
                Some(path) => {
                    tokio::fs::write(path, yaml)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!("配置已写入 {}", path.display());
                }
                None => print!("{yaml}"),
            }
        }
        Commands::Decode { links, udp } => {
            let proxies = registry.decode_all(&DecodeConfig { use_udp: udp }, &links)?;
            print!("{}", NodeList { proxies }.to_yaml()?);
        }
        Commands::Encode { links } => {
            let proxies = registry.decode_all(&DecodeConfig::default(), &links)?;
            for proxy in &proxies {
                match registry.encode(proxy) {
                    Some(link) => println!("{link}"),
                    None => tracing::warn!("无法编码节点: {}", proxy.name),
                }
            }
        }
    }

    Ok(())
}

/// 执行 KEY=VALUE 格式参数解析
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid PATTERN=TO: no = found in {}", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// 解析 `behavior,url,group[,prepend[,name]]`
fn parse_rule_provider(s: &str) -> std::result::Result<RuleProviderInsertion, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [behavior, url, group, rest @ ..] = parts.as_slice() else {
        return Err(format!("invalid rule provider `{s}`: expected behavior,url,group[,prepend[,name]]"));
    };
    let prepend = match rest.first() {
        Some(flag) => bool::from_str(flag).map_err(|e| format!("invalid prepend flag in `{s}`: {e}"))?,
        None => false,
    };
    Ok(RuleProviderInsertion::builder()
        .behavior(*behavior)
        .url(*url)
        .group(*group)
        .prepend(prepend)
        .name(rest.get(1).copied().unwrap_or_default())
        .build())
}
