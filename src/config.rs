use clap::Parser;
use sqlx::postgres::PgConnectOptions;

use crate::collectors::hh::DEFAULT_MAX_PAGES;

#[derive(Parser, Debug, Clone)]
#[command(name = "hhloader", about = "HeadHunter employers and vacancies loader")]
pub struct Config {
    #[command(flatten)]
    pub db: DbParams,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Connection parameters for the PostgreSQL database.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct DbParams {
    /// Database host
    #[arg(long = "db-host", env = "PGHOST", default_value = "localhost")]
    pub host: String,

    /// Database user
    #[arg(long = "db-user", env = "PGUSER", default_value = "postgres")]
    pub user: String,

    /// Database port
    #[arg(long = "db-port", env = "PGPORT", default_value = "5432")]
    pub port: u16,

    /// Database name
    #[arg(long = "db-name", env = "PGDATABASE", default_value = "postgres")]
    pub dbname: String,

    /// Database password
    #[arg(long = "db-password", env = "PGPASSWORD")]
    pub password: Option<String>,
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the database if missing and run schema migrations
    Init,
    /// Fetch top employers with their vacancies and store them
    Load {
        /// Number of top employers to load (1-100)
        #[arg(long, default_value = "10")]
        top: String,

        /// Maximum vacancy pages fetched per employer
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: u32,
    },
    /// Search employers with open vacancies by keyword
    Search {
        keyword: String,
    },
    /// Interactive read queries (default when no subcommand given)
    Query,
}

impl Config {
    /// Resolve the command, defaulting to Query if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Query)
    }
}

impl DbParams {
    pub fn connect_options(&self) -> PgConnectOptions {
        self.connect_options_for(&self.dbname)
    }

    /// Same server and credentials, different database.
    pub fn connect_options_for(&self, dbname: &str) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(dbname);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl Default for DbParams {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "postgres".to_string(),
            port: 5432,
            dbname: "postgres".to_string(),
            password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    /// Declared default and env variable of one argument.
    fn arg_source(id: &str) -> (Option<String>, Option<String>) {
        let command = Config::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .unwrap();
        let default = arg
            .get_default_values()
            .first()
            .map(|v| v.to_string_lossy().into_owned());
        let env = arg.get_env().map(|v| v.to_string_lossy().into_owned());
        (default, env)
    }

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn command_definition_is_valid() {
        Config::command().debug_assert();
    }

    #[test]
    fn defaults_and_env_keys() {
        assert_eq!(arg_source("host"), (some("localhost"), some("PGHOST")));
        assert_eq!(arg_source("user"), (some("postgres"), some("PGUSER")));
        assert_eq!(arg_source("port"), (some("5432"), some("PGPORT")));
        assert_eq!(arg_source("dbname"), (some("postgres"), some("PGDATABASE")));
        assert_eq!(arg_source("password"), (None, some("PGPASSWORD")));
    }

    #[test]
    fn default_params_match_declared_defaults() {
        let params = DbParams::default();
        assert_eq!(arg_source("host").0, Some(params.host));
        assert_eq!(arg_source("user").0, Some(params.user));
        assert_eq!(arg_source("port").0, Some(params.port.to_string()));
        assert_eq!(arg_source("dbname").0, Some(params.dbname));
        assert_eq!(params.password, None);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "hhloader",
            "--db-host",
            "db.internal",
            "--db-user",
            "loader",
            "--db-port",
            "6543",
            "--db-name",
            "hh",
            "--db-password",
            "secret",
            "load",
            "--top",
            "5",
        ])
        .unwrap();
        assert_eq!(
            config.db,
            DbParams {
                host: "db.internal".to_string(),
                user: "loader".to_string(),
                port: 6543,
                dbname: "hh".to_string(),
                password: Some("secret".to_string()),
            }
        );
        assert_eq!(
            config.resolved_command(),
            Command::Load {
                top: "5".to_string(),
                max_pages: DEFAULT_MAX_PAGES
            }
        );
    }

    #[test]
    fn missing_subcommand_means_query() {
        let config = Config {
            db: DbParams::default(),
            command: None,
        };
        assert_eq!(config.resolved_command(), Command::Query);
    }

    #[test]
    fn connect_options_target_requested_database() {
        let params = DbParams::default();
        assert_eq!(params.connect_options().get_database(), Some("postgres"));
        assert_eq!(params.connect_options_for("hh").get_database(), Some("hh"));
        assert_eq!(params.connect_options().get_host(), "localhost");
        assert_eq!(params.connect_options().get_port(), 5432);
    }
}
