use anyhow::{Context, Result};
use ascii_map::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_DENSITY_RADIUS, DEFAULT_HEIGHT, DEFAULT_PADDING_FRACTION,
    DEFAULT_WIDTH,
};
use ascii_map::extractor::normalize_country_code;
use ascii_map::{CoordinateCache, MapError, MapRenderer, RecordSource, RenderOptions};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 郵便番号データ（セミコロン区切りCSV、またはCSVを含むZIPファイル）
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// 描画する国コード
    #[arg(short, long, default_value = "US")]
    country: String,

    /// 地図の幅（文字数、最小10）
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// 地図の高さ（行数、最小5）
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// ANSIカラーで出力
    #[arg(long)]
    color: bool,

    /// 境界の余白の割合（イギリス向けは0.05）
    #[arg(long, default_value_t = DEFAULT_PADDING_FRACTION)]
    padding: f64,

    /// 密度の広がり半径（マンハッタン距離）
    #[arg(long, default_value_t = DEFAULT_DENSITY_RADIUS)]
    radius: usize,

    /// 並列処理のバッチサイズ
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// 並列処理スレッド数（デフォルト: CPUコア数）
    #[arg(short, long)]
    threads: Option<usize>,

    /// 全ての国の座標を起動時に読み込む
    #[arg(long)]
    preload: bool,

    /// 利用可能な国コードを一覧表示
    #[arg(long)]
    list_available: bool,
}

fn main() -> ExitCode {
    // ログの初期化（地図は標準出力に出すため、ログは標準エラー出力へ）
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // データが無い場合と使い方の誤りを区別して表示する
            match e.downcast_ref::<MapError>() {
                Some(MapError::NoData(code)) => {
                    eprintln!("No data found for country code: {}", code);
                    eprintln!("Use --list-available to see available country codes");
                }
                Some(MapError::InvalidInput(msg)) => {
                    eprintln!("Usage error: {}", msg);
                }
                _ => {
                    error!("{:#}", e);
                    eprintln!("Error: {:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    // 処理開始時間を記録
    let start_time = std::time::Instant::now();

    // スレッドプールの設定
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    // 描画設定は読み込み前に検証する
    let options = RenderOptions {
        density_radius: args.radius,
        padding_fraction: args.padding,
        color_enabled: args.color,
    };
    let renderer = MapRenderer::new(args.width, args.height, options)?;

    info!("Loading postal code data: {:?}", args.input);
    let source = RecordSource::open(&args.input);
    let cache = CoordinateCache::load(source, args.batch_size)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if args.list_available {
        println!(
            "Available country codes: {}",
            cache.available_country_codes().join(", ")
        );
        return Ok(());
    }

    if args.preload {
        cache.preload()?;
    }

    let country_code = normalize_country_code(&args.country);
    if country_code.is_empty() {
        return Err(MapError::InvalidInput("country code is empty".to_string()).into());
    }
    let coordinates = cache.coordinates_for(&country_code)?;
    let map = renderer.render_country(&country_code, &coordinates)?;
    print!("{}", map);

    // 処理時間を表示
    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}
