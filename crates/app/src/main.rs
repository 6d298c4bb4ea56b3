use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use practice_core::model::{CourseId, ParseIdError, TopicId};
use services::{ApiConfig, HttpPracticeApi, NavigationLock, PracticeLoopService};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, source: ParseIdError },
    InvalidApiUrl { raw: String },
    MissingTopic,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, source } => write!(f, "invalid {flag} value: {source}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api-url value: {raw}"),
            ArgsError::MissingTopic => write!(f, "--topic-id (or ELEARN_TOPIC_ID) is required"),
        }
    }
}

impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::InvalidId { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_id<T>(flag: &'static str, raw: &str) -> Result<T, ArgsError>
where
    T: FromStr<Err = ParseIdError>,
{
    raw.parse().map_err(|source| ArgsError::InvalidId { flag, source })
}

struct DesktopApp {
    topic_id: TopicId,
    course_id: Option<CourseId>,
    practice_loop: Arc<PracticeLoopService>,
    navigation_lock: NavigationLock,
}

impl UiApp for DesktopApp {
    fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    fn course_id(&self) -> Option<CourseId> {
        self.course_id
    }

    fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }

    fn navigation_lock(&self) -> NavigationLock {
        self.navigation_lock.clone()
    }
}

struct Args {
    api: ApiConfig,
    topic_id: TopicId,
    course_id: Option<CourseId>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--api-url <url>] [--token <token>] [--course-id <id>] --topic-id <id>"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url {}", services::config::DEFAULT_API_URL);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ELEARN_API_URL, ELEARN_TOKEN, ELEARN_COURSE_ID, ELEARN_TOPIC_ID");
    eprintln!("  RUST_LOG (default: info)");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut api = ApiConfig::from_env();
        let mut topic_id = env_id::<TopicId>("ELEARN_TOPIC_ID")?;
        let mut course_id = env_id::<CourseId>("ELEARN_COURSE_ID")?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => {
                    let value = require_value(args, "--api-url")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    api.base_url = value;
                }
                "--token" => {
                    let value = require_value(args, "--token")?;
                    api = api.with_token(Some(value));
                }
                "--course-id" => {
                    let value = require_value(args, "--course-id")?;
                    course_id = Some(parse_id("--course-id", &value)?);
                }
                "--topic-id" => {
                    let value = require_value(args, "--topic-id")?;
                    topic_id = Some(parse_id("--topic-id", &value)?);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let topic_id = topic_id.ok_or(ArgsError::MissingTopic)?;
        Ok(Some(Self {
            api,
            topic_id,
            course_id,
        }))
    }
}

fn env_id<T>(key: &'static str) -> Result<Option<T>, ArgsError>
where
    T: FromStr<Err = ParseIdError>,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => parse_id(key, &value).map(Some),
        _ => Ok(None),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(parsed) = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing();

    let api = HttpPracticeApi::new(&parsed.api)?;
    let practice_loop = Arc::new(PracticeLoopService::new(Arc::new(api)));
    info!(
        api_url = %parsed.api.base_url,
        topic_id = %parsed.topic_id,
        authenticated = parsed.api.token.is_some(),
        "starting practice client"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        topic_id: parsed.topic_id,
        course_id: parsed.course_id,
        practice_loop,
        navigation_lock: NavigationLock::new(),
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Practice")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

// The desktop launcher owns the async runtime, so `main` stays synchronous.
fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
