mod config;
mod ingest;
mod review;
mod storage;
mod utils;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

use config::{AppConfig, Taxonomy};
use ingest::{IngestPipeline, LogProgress, PaperSource, QuestionType, TesseractOcr};
use review::ReviewSession;
use storage::models::Question;
use storage::Database;
use utils::logger;

#[derive(Parser)]
#[command(name = "gatebot")]
#[command(about = "GATE真题试卷导入与题库管理工具", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化配置和数据库
    Init,
    /// 导入一份试卷（文件或粘贴文本）
    Import {
        /// 试卷文件路径（pdf/png/jpg/jpeg/txt）
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// 直接粘贴的试卷文本
        #[arg(short, long)]
        text: Option<String>,
        /// 真题年份标签
        #[arg(short, long)]
        year: Option<String>,
        /// 关键词不命中时的默认科目
        #[arg(short, long)]
        subject: Option<String>,
        /// 只提取并预览，不写入数据库
        #[arg(long)]
        dry_run: bool,
        /// 把提取出的草稿另存为JSON，便于外部编辑后用 commit 入库
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// 把外部编辑过的草稿JSON入库
    Commit {
        /// import --export 产出的草稿文件
        #[arg(short, long)]
        drafts: PathBuf,
    },
    /// 查看题库统计
    Stats,
    /// 清空题库
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init_logger();
    info!("gatebot 启动");

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_command().await?;
        }
        Commands::Import {
            file,
            text,
            year,
            subject,
            dry_run,
            export,
        } => {
            import_command(file, text, year, subject, dry_run, export).await?;
        }
        Commands::Commit { drafts } => {
            commit_command(drafts).await?;
        }
        Commands::Stats => {
            stats_command().await?;
        }
        Commands::Clean => {
            clean_command().await?;
        }
    }

    Ok(())
}

async fn init_command() -> Result<()> {
    info!("初始化系统...");

    // 创建必要的目录
    tokio::fs::create_dir_all("data").await?;
    tokio::fs::create_dir_all("config").await?;

    // 生成默认配置文件
    let app_config = AppConfig::default();
    app_config.save("config/settings.toml")?;
    info!("已生成配置文件: config/settings.toml");

    let taxonomy = Taxonomy::default();
    let taxonomy_toml = toml::to_string_pretty(&taxonomy)?;
    tokio::fs::write("config/taxonomy.toml", taxonomy_toml).await?;
    info!("已生成分类表: config/taxonomy.toml");

    // 初始化数据库
    let db_url = format!("sqlite:{}", app_config.storage.database_path);
    info!("正在初始化数据库: {}", db_url);
    let db = Database::new(&db_url).await?;
    db.init_schema().await?;
    info!("数据库初始化完成");

    info!("✅ 系统初始化完成！");
    info!("下一步:");
    info!("  1. 需要时编辑 config/taxonomy.toml 调整科目与关键词");
    info!("  2. 运行 'gatebot import --file paper.pdf' 导入试卷");

    Ok(())
}

async fn import_command(
    file: Option<PathBuf>,
    text: Option<String>,
    year: Option<String>,
    subject: Option<String>,
    dry_run: bool,
    export: Option<PathBuf>,
) -> Result<()> {
    let app_config = AppConfig::load()?;
    let taxonomy = Taxonomy::load()?;

    if let Some(ref s) = subject {
        if taxonomy.subject(s).is_none() {
            bail!("未知科目: {}，请检查 config/taxonomy.toml", s);
        }
    }

    let (source, source_tag) = match (file, text) {
        (Some(path), None) => {
            let tag = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "file".to_string());
            (PaperSource::File(path), tag)
        }
        (None, Some(pasted)) => (PaperSource::Pasted(pasted), "paste".to_string()),
        _ => bail!("请通过 --file 或 --text 指定一种输入"),
    };

    info!("开始导入: {}", source_tag);
    let ocr = TesseractOcr::new(app_config.ocr.tesseract_path.clone());
    let pipeline = IngestPipeline::new(&taxonomy, &ocr)
        .with_default_subject(subject)
        .with_year(year);

    let drafts = pipeline.run(&source, &LogProgress).await?;

    // 提取结果总览
    let mcq = drafts
        .iter()
        .filter(|d| d.question_type == QuestionType::Mcq)
        .count();
    let numerical = drafts
        .iter()
        .filter(|d| d.question_type == QuestionType::Numerical)
        .count();
    let subjects: HashSet<&str> = drafts.iter().map(|d| d.subject.as_str()).collect();
    info!(
        "共识别 {} 道题目 (选择 {}, 数值 {}, 其余主观)，涉及 {} 个科目",
        drafts.len(),
        mcq,
        numerical,
        subjects.len()
    );

    for draft in &drafts {
        let preview: String = draft.question.chars().take(60).collect();
        info!("---");
        info!("题号: {} ({})", draft.question_number, draft.temp_id);
        info!("题干: {}", preview);
        info!(
            "科目: {} / {}  类型: {}  难度: {}  分值: {}",
            taxonomy.subject_label(&draft.subject),
            draft.topic,
            draft.question_type.as_str(),
            draft.difficulty.as_str(),
            draft.marks
        );
    }

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&drafts)?;
        tokio::fs::write(&path, json).await?;
        info!("草稿已导出: {}", path.display());
    }

    if dry_run {
        info!("dry-run 模式，未写入数据库");
        return Ok(());
    }

    // 答案索引默认是占位值，入库前仍需人工确认
    let session = ReviewSession::new(&taxonomy, drafts);
    let approved = session.commit();
    if approved.is_empty() {
        info!("没有可入库的题目");
        return Ok(());
    }

    let db = Database::new(&format!("sqlite:{}", app_config.storage.database_path)).await?;
    db.init_schema().await?;

    let rows: Vec<Question> = approved
        .iter()
        .map(|d| Question::from_draft(d, &source_tag))
        .collect();
    let saved = db.save_questions(&rows).await?;

    info!("✅ 导入完成: {} 道题目已入库", saved);
    Ok(())
}

async fn commit_command(drafts_path: PathBuf) -> Result<()> {
    let app_config = AppConfig::load()?;
    let taxonomy = Taxonomy::load()?;

    let content = tokio::fs::read_to_string(&drafts_path).await?;
    let drafts: Vec<ingest::QuestionDraft> = serde_json::from_str(&content)?;
    info!("读入 {} 条草稿: {}", drafts.len(), drafts_path.display());

    // 外部编辑过的内容要先恢复科目/主题不变量
    let session = ReviewSession::from_unchecked(&taxonomy, drafts);
    let approved = session.commit();
    if approved.is_empty() {
        info!("没有可入库的题目");
        return Ok(());
    }

    let db = Database::new(&format!("sqlite:{}", app_config.storage.database_path)).await?;
    db.init_schema().await?;

    let source_tag = drafts_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "drafts".to_string());
    let rows: Vec<Question> = approved
        .iter()
        .map(|d| Question::from_draft(d, &source_tag))
        .collect();
    let saved = db.save_questions(&rows).await?;

    info!("✅ 入库完成: {} 道题目", saved);
    Ok(())
}

async fn stats_command() -> Result<()> {
    let app_config = AppConfig::load()?;
    let taxonomy = Taxonomy::load()?;
    let db = Database::new(&format!("sqlite:{}", app_config.storage.database_path)).await?;
    db.init_schema().await?;

    let total = db.total_questions().await?;
    info!("题库共 {} 道题目", total);

    if total == 0 {
        info!("题库为空，先运行 'gatebot import' 导入试卷");
        return Ok(());
    }

    info!("按科目:");
    for (subject, count) in db.count_by_subject().await? {
        info!("  {} : {}", taxonomy.subject_label(&subject), count);
    }

    info!("按类型:");
    for (qtype, count) in db.count_by_type().await? {
        info!("  {} : {}", qtype, count);
    }

    info!("按难度:");
    for (difficulty, count) in db.count_by_difficulty().await? {
        info!("  {} : {}", difficulty, count);
    }

    Ok(())
}

async fn clean_command() -> Result<()> {
    info!("开始清空题库...");

    let app_config = AppConfig::load()?;
    let db = Database::new(&format!("sqlite:{}", app_config.storage.database_path)).await?;
    db.init_schema().await?;
    db.clear_all_tables().await?;

    info!("✅ 清理完成");
    Ok(())
}
