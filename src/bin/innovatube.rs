use clap::{Arg, ArgMatches, Command};
use innovatube_client::dashboard::{Category, Dashboard, FavoriteChange, CATEGORIES};
use innovatube_client::forms::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use innovatube_client::messages::{user_message, Action};
use innovatube_client::routes::{self, Screen};
use innovatube_client::session::Session;
use innovatube_client::videos::{Video, VideosClient};
use innovatube_client::InnovaTube;
use log::error;
use std::process::ExitCode;

fn cli() -> Command<'static> {
    let captcha = || {
        Arg::new("captcha")
            .long("captcha")
            .value_name("TOKEN")
            .takes_value(true)
            .help("Bot-verification token (required when RECAPTCHA_SITE_KEY is set)")
    };

    Command::new("innovatube")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Search YouTube and manage your InnovaTube favorites")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(Arg::new("first-name").long("first-name").takes_value(true).required(true))
                .arg(Arg::new("last-name").long("last-name").takes_value(true).required(true))
                .arg(Arg::new("username").long("username").takes_value(true).required(true))
                .arg(Arg::new("email").long("email").takes_value(true).required(true))
                .arg(Arg::new("password").long("password").takes_value(true).required(true))
                .arg(captcha()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in with a username or email")
                .arg(Arg::new("identifier").required(true))
                .arg(Arg::new("password").required(true))
                .arg(captcha()),
        )
        .subcommand(
            Command::new("refresh")
                .about("Refresh the access token")
                .arg(Arg::new("refresh-token").long("refresh-token").takes_value(true)),
        )
        .subcommand(
            Command::new("forgot-password")
                .about("Request password reset instructions")
                .arg(Arg::new("identifier").required(true)),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password with the emailed code")
                .arg(Arg::new("code").required(true))
                .arg(Arg::new("new-password").required(true))
                .arg(Arg::new("confirm").required(true)),
        )
        .subcommand(Command::new("logout").about("Sign out and forget the local session"))
        .subcommand(Command::new("whoami").about("Show the stored session"))
        .subcommand(
            Command::new("open")
                .about("Show which screen a path leads to")
                .arg(Arg::new("path").required(true)),
        )
        .subcommand(
            Command::new("search")
                .about("Search YouTube")
                .arg(Arg::new("query").required(true).multiple_values(true)),
        )
        .subcommand(
            Command::new("category")
                .about("Search a category: All, Games, Football, Technology, Cooking")
                .arg(Arg::new("label").required(true)),
        )
        .subcommand(Command::new("feed").about("Show the dashboard feed"))
        .subcommand(
            Command::new("favorites")
                .about("List your favorites")
                .arg(Arg::new("search").long("search").takes_value(true))
                .arg(Arg::new("filter").long("filter").takes_value(true)),
        )
        .subcommand(
            Command::new("toggle")
                .about("Search, then add or remove the N-th result (1-based) from favorites")
                .arg(Arg::new("index").required(true))
                .arg(Arg::new("query").required(true).multiple_values(true)),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a video from favorites")
                .arg(Arg::new("video-id").required(true)),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let client = match InnovaTube::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let matches = cli().get_matches();
    match run(&client, &matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &InnovaTube, matches: &ArgMatches) -> Result<(), String> {
    let (name, args) = matches.subcommand().ok_or("missing command")?;

    if is_dashboard_command(name) {
        let nav = routes::resolve("/", client.session().as_ref());
        if nav.screen != Screen::Dashboard {
            return Err(
                "You need to sign in first: innovatube login <identifier> <password>".into(),
            );
        }
    }

    match name {
        "register" => {
            let form = RegisterForm {
                first_name: value(args, "first-name"),
                last_name: value(args, "last-name"),
                username: value(args, "username"),
                email: value(args, "email"),
                password: value(args, "password"),
                captcha_token: args.value_of("captcha").map(str::to_string),
            };
            client
                .auth()
                .sign_up(&form)
                .await
                .map_err(|e| user_message(Action::Register, &e))?;
            println!("Registration successful. You can sign in now.");
        }
        "login" => {
            let form = LoginForm {
                identifier: value(args, "identifier"),
                password: value(args, "password"),
                captcha_token: args.value_of("captcha").map(str::to_string),
            };
            let data = client
                .auth()
                .sign_in(&form)
                .await
                .map_err(|e| user_message(Action::Login, &e))?;
            let session = Session::from_response(&data);
            if !session.is_authenticated() {
                return Err("The server did not return a session. Please try again.".into());
            }
            println!("Signed in as {}", session.username.unwrap_or_default());
        }
        "refresh" => {
            let token = args
                .value_of("refresh-token")
                .map(str::to_string)
                .or_else(|| client.session().and_then(|s| s.refresh_token))
                .ok_or("No refresh token available")?;
            client
                .auth()
                .refresh_token(&token)
                .await
                .map_err(|e| user_message(Action::RefreshSession, &e))?;
            println!("Session refreshed.");
        }
        "forgot-password" => {
            let form = ForgotPasswordForm {
                identifier: value(args, "identifier"),
            };
            client
                .auth()
                .request_password_reset(&form)
                .await
                .map_err(|e| user_message(Action::ForgotPassword, &e))?;
            println!("If the account exists, reset instructions were sent.");
        }
        "reset-password" => {
            let form = ResetPasswordForm {
                code: value(args, "code"),
                new_password: value(args, "new-password"),
                confirm_password: value(args, "confirm"),
            };
            client
                .auth()
                .confirm_password_reset(&form)
                .await
                .map_err(|e| user_message(Action::ResetPassword, &e))?;
            println!("Password updated. You can sign in now.");
        }
        "logout" => {
            client.auth().sign_out().await;
            println!("Signed out.");
        }
        "whoami" => match client.session() {
            Some(session) if session.is_authenticated() => {
                println!("username:   {}", session.username.as_deref().unwrap_or("-"));
                println!("email:      {}", session.email.as_deref().unwrap_or("-"));
                match session.session_id {
                    Some(id) => println!("session id: {id}"),
                    None => println!("session id: -"),
                }
            }
            _ => println!("Not signed in."),
        },
        "open" => {
            let path = value(args, "path");
            let nav = routes::resolve(&path, client.session().as_ref());
            match nav.return_to {
                Some(from) => println!(
                    "{:?} (then back to {})",
                    nav.screen,
                    routes::after_login(Some(from.as_str()))
                ),
                None => println!("{:?}", nav.screen),
            }
        }
        "search" => {
            let mut dashboard = loaded_dashboard(client).await?;
            dashboard.submit_query(&joined(args, "query")).await;
            print_feed(&dashboard)?;
        }
        "category" => {
            let label = value(args, "label");
            let category = Category::by_label(&label).ok_or_else(|| {
                let labels: Vec<_> = CATEGORIES.iter().map(|c| c.label).collect();
                format!("Unknown category {label:?}; pick one of {}", labels.join(", "))
            })?;
            let mut dashboard = loaded_dashboard(client).await?;
            dashboard.select_category(category).await;
            print_feed(&dashboard)?;
        }
        "feed" => {
            let dashboard = loaded_dashboard(client).await?;
            print_feed(&dashboard)?;
        }
        "favorites" => {
            let mut view = client.favorites_view();
            view.load(args.value_of("search")).await;
            if let Some(err) = view.error() {
                return Err(err.to_string());
            }
            view.set_filter(args.value_of("filter").unwrap_or_default());
            let shown = view.filtered();
            if shown.is_empty() {
                println!("No favorites yet. Use `innovatube toggle` to add some.");
            }
            for video in shown {
                let year = video
                    .published_year()
                    .map(|y| y.to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {}  [{}] {}",
                    video.video_id,
                    truncate(&video.title, 65),
                    video.channel_title,
                    year
                );
            }
        }
        "toggle" => {
            let index: usize = value(args, "index")
                .parse()
                .map_err(|_| "index must be a positive number".to_string())?;
            let mut dashboard = loaded_dashboard(client).await?;
            dashboard.submit_query(&joined(args, "query")).await;
            if let Some(err) = dashboard.error() {
                return Err(err.to_string());
            }
            let video = index
                .checked_sub(1)
                .and_then(|i| dashboard.results().get(i))
                .cloned()
                .ok_or_else(|| format!("No result number {index}"))?;
            match dashboard.toggle_favorite(&video).await {
                Some(FavoriteChange::Added) => println!("Added {:?} to favorites.", video.title),
                Some(FavoriteChange::Removed) => {
                    println!("Removed {:?} from favorites.", video.title)
                }
                None => return Err(dashboard.error().unwrap_or_default().to_string()),
            }
        }
        "remove" => {
            let mut view = client.favorites_view();
            let video = Video {
                video_id: value(args, "video-id"),
                ..Default::default()
            };
            if !view.remove(&video).await {
                return Err(view.error().unwrap_or_default().to_string());
            }
            println!("Removed {} from favorites.", video.video_id);
        }
        other => {
            error!("unhandled command {other}");
            return Err(format!("unknown command {other}"));
        }
    }

    Ok(())
}

fn is_dashboard_command(name: &str) -> bool {
    matches!(name, "search" | "category" | "feed" | "favorites" | "toggle" | "remove")
}

async fn loaded_dashboard(client: &InnovaTube) -> Result<Dashboard<VideosClient>, String> {
    Dashboard::open(client.videos()).await
}

fn print_feed(dashboard: &Dashboard<VideosClient>) -> Result<(), String> {
    if let Some(err) = dashboard.error() {
        return Err(err.to_string());
    }
    println!("{}", dashboard.results_subtitle());
    for (i, video) in dashboard.feed().iter().enumerate() {
        let marker = if dashboard.is_favorite(&video.video_id) { "*" } else { " " };
        println!("{:>2}.{} {}", i + 1, marker, truncate(&video.title, 80));
        println!("     {} - {}", video.channel_title, video.watch_url());
    }
    Ok(())
}

fn value(args: &ArgMatches, name: &str) -> String {
    args.value_of(name).unwrap_or_default().to_string()
}

fn joined(args: &ArgMatches, name: &str) -> String {
    args.values_of(name)
        .map(|v| v.collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
