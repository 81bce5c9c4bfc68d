use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::entities::{
    Credentials, FavoriteStatus, Movie, ProfileEdit, Registration, UserSummary,
};
use crate::domain::errors::ApiError;
use crate::domain::ports::MovieApi;
use crate::domain::session::SessionStore;
use crate::frameworks::config;
use crate::frameworks::storage::FileStorage;
use crate::interface_adapters::gateway::{ApiGateway, GatewayBuildError};
use crate::interface_adapters::normalize::parse_birthday;
use crate::use_cases::{
    DeleteAccountUseCase, FavoritesSynchronizer, LoginUseCase, LogoutUseCase, RegisterUseCase,
    ToggleError, UpdateProfileUseCase,
};

const USAGE: &str = "usage: movie_client <command>
  register <username> <password> <email> [birthday]
  login <username> <password>
  logout
  movies
  profile
  update [--username V] [--email V] [--birthday YYYY-MM-DD] [--password V]
  delete-account
  favorites
  toggle <movie-id>";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}\n\n{usage}", usage = USAGE)]
    Usage(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Toggle(#[from] ToggleError),
    #[error("cannot reach the movie service: {0}")]
    Build(#[from] GatewayBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Register(Registration),
    Login(Credentials),
    Logout,
    Movies,
    Profile,
    Update(ProfileFlags),
    DeleteAccount,
    Favorites,
    Toggle(String),
}

// Flags given to `update`; absent flags keep the current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ProfileFlags {
    username: Option<String>,
    email: Option<String>,
    birthday: Option<NaiveDate>,
    password: Option<String>,
}

struct App {
    api: Arc<dyn MovieApi>,
    session: Arc<SessionStore>,
    favorites: Arc<FavoritesSynchronizer>,
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    // Logs go to stderr so command output on stdout stays clean.
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match execute(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &[String]) -> Result<(), CliError> {
    let command = parse_command(args)?;

    let storage = Arc::new(FileStorage::new(config::session_path()));
    debug!(path = %storage.path().display(), "loading session");
    let session = Arc::new(SessionStore::load(storage));
    let gateway = ApiGateway::new(
        &config::api_base_url(),
        config::request_timeout(),
        session.clone(),
    )?;
    let api: Arc<dyn MovieApi> = Arc::new(gateway);
    let favorites = Arc::new(FavoritesSynchronizer::new(api.clone()));
    if let Some(user) = session.user() {
        favorites.seed(user.favorite_movies);
    }

    info!(base_url = %config::api_base_url(), "movie client ready");
    let app = App {
        api,
        session,
        favorites,
    };
    app.dispatch(command).await
}

impl App {
    async fn dispatch(&self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Register(registration) => {
                let register = RegisterUseCase {
                    api: self.api.clone(),
                };
                let profile = register.execute(registration).await?;
                println!("Registered {}. You can now log in.", profile.username);
            }
            Command::Login(credentials) => {
                let login = LoginUseCase {
                    api: self.api.clone(),
                    session: self.session.clone(),
                    favorites: self.favorites.clone(),
                };
                let outcome = login.execute(credentials).await?;
                println!("Logged in as {}.", outcome.user.username);
            }
            Command::Logout => {
                let logout = LogoutUseCase {
                    session: self.session.clone(),
                    favorites: self.favorites.clone(),
                };
                logout.execute();
                println!("Logged out.");
            }
            Command::Movies => {
                let movies = self.api.list_movies().await?;
                for movie in &movies {
                    println!("{}", self.render_movie(movie));
                }
            }
            Command::Profile => {
                let profile = self.favorites.load().await?;
                println!("Username:  {}", profile.username);
                println!("Email:     {}", profile.email);
                match profile.birthday {
                    Some(day) => println!("Birthday:  {day}"),
                    None => println!("Birthday:  -"),
                }
                println!("Favorites: {}", profile.favorite_movies.join(", "));
            }
            Command::Update(flags) => {
                let current = self.favorites.load().await?;
                let edit = ProfileEdit {
                    username: flags.username.unwrap_or_else(|| current.username.clone()),
                    email: flags.email.unwrap_or_else(|| current.email.clone()),
                    birthday: flags.birthday,
                    password: flags.password,
                };
                let update = UpdateProfileUseCase {
                    api: self.api.clone(),
                    session: self.session.clone(),
                };
                let profile = update.execute(&current, edit).await?;
                println!("Profile saved for {}.", profile.username);
            }
            Command::DeleteAccount => {
                let delete = DeleteAccountUseCase {
                    api: self.api.clone(),
                    session: self.session.clone(),
                    favorites: self.favorites.clone(),
                };
                delete.execute().await?;
                println!("Account deleted.");
            }
            Command::Favorites => {
                self.favorites.load().await?;
                for id in self.favorites.favorites() {
                    println!("{id}");
                }
            }
            Command::Toggle(movie_id) => {
                // Start from the server's list rather than the possibly stale stored one.
                self.favorites.load().await?;
                let status = self.favorites.toggle(&movie_id).await?;
                if let Some(user) = self.session.user() {
                    self.session.update_user(UserSummary {
                        favorite_movies: self.favorites.favorites(),
                        ..user
                    });
                }
                match status {
                    FavoriteStatus::Favorite => println!("{movie_id} added to favorites."),
                    FavoriteStatus::NotFavorite => println!("{movie_id} removed from favorites."),
                    FavoriteStatus::Pending => println!("{movie_id} is still being updated."),
                }
            }
        }
        Ok(())
    }

    fn render_movie(&self, movie: &Movie) -> String {
        let marker = if self.favorites.is_favorite(&movie.id) {
            '*'
        } else {
            ' '
        };
        let year = movie
            .release_year
            .map(|year| format!(" ({year})"))
            .unwrap_or_default();
        format!(
            "{marker} {}\t{}{year}\t{}\t{}",
            movie.id, movie.title, movie.genre.name, movie.director.name
        )
    }
}

fn parse_command(args: &[String]) -> Result<Command, CliError> {
    let (name, rest) = args
        .split_first()
        .ok_or_else(|| CliError::Usage("missing command".to_string()))?;
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("register", [username, password, email]) => Command::Register(Registration {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            birthday: None,
        }),
        ("register", [username, password, email, birthday]) => {
            Command::Register(Registration {
                username: username.to_string(),
                password: password.to_string(),
                email: email.to_string(),
                birthday: Some(parse_date(birthday)?),
            })
        }
        ("login", [username, password]) => Command::Login(Credentials::new(*username, *password)),
        ("logout", []) => Command::Logout,
        ("movies", []) => Command::Movies,
        ("profile", []) => Command::Profile,
        ("update", flags) => Command::Update(parse_profile_flags(flags)?),
        ("delete-account", []) => Command::DeleteAccount,
        ("favorites", []) => Command::Favorites,
        ("toggle", [movie_id]) => Command::Toggle(movie_id.to_string()),
        (other, _) => {
            return Err(CliError::Usage(format!(
                "unknown command or wrong arguments: {other}"
            )));
        }
    };
    Ok(command)
}

fn parse_profile_flags(args: &[&str]) -> Result<ProfileFlags, CliError> {
    let mut flags = ProfileFlags::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))?;
        match *flag {
            "--username" => flags.username = Some(value.to_string()),
            "--email" => flags.email = Some(value.to_string()),
            "--birthday" => flags.birthday = Some(parse_date(value)?),
            "--password" => flags.password = Some(value.to_string()),
            other => return Err(CliError::Usage(format!("unknown flag: {other}"))),
        }
    }
    Ok(flags)
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    parse_birthday(raw).ok_or_else(|| CliError::Usage(format!("invalid date: {raw}")))
}
