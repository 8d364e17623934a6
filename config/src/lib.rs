use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Error as IOError;
use std::path::{Path, PathBuf};
use std::str::from_utf8;
use std::str::FromStr;
use std::str::Utf8Error;

use logger::{Level, Logger};
use thiserror::Error;
use util::{splitargs, SplitArgsError};

pub struct Config {
    pub logger: Logger,
    pub pidfile: Option<String>,
    pub syslog_enabled: bool,
    pub syslog_ident: String,
    pub syslog_facility: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid format")]
    InvalidFormat,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("unknown option {0:?}")]
    UnknownOption(String),
    #[error(transparent)]
    IOError(#[from] IOError),
}

impl From<Utf8Error> for ConfigError {
    fn from(_: Utf8Error) -> ConfigError {
        ConfigError::InvalidParameter
    }
}

impl From<SplitArgsError> for ConfigError {
    fn from(_: SplitArgsError) -> ConfigError {
        ConfigError::InvalidFormat
    }
}

fn read_string(args: &[Vec<u8>]) -> Result<String, ConfigError> {
    if args.len() != 2 {
        Err(ConfigError::InvalidFormat)
    } else {
        Ok(from_utf8(&args[1])?.to_owned())
    }
}

fn read_parse<T>(args: &[Vec<u8>]) -> Result<T, ConfigError>
where
    T: FromStr,
{
    read_string(args)?
        .parse()
        .map_err(|_| ConfigError::InvalidParameter)
}

fn read_bool(args: &[Vec<u8>]) -> Result<bool, ConfigError> {
    Ok(match &*read_string(args)? {
        "yes" => true,
        "no" => false,
        _ => return Err(ConfigError::InvalidFormat),
    })
}

impl Config {
    pub fn new(logger: Logger) -> Config {
        Config {
            logger,
            pidfile: None,
            syslog_enabled: false,
            syslog_ident: "pidprovider".to_owned(),
            syslog_facility: "local0".to_owned(),
        }
    }

    /// Reads a file with one `option value` per line. The logger is
    /// reconfigured as soon as `loglevel` or `logfile` are read; syslog is
    /// enabled once the whole file was parsed.
    pub fn parsefile(&mut self, fname: &str) -> Result<(), ConfigError> {
        self.parse_lines(fname, &mut Vec::new())?;
        if self.syslog_enabled {
            self.logger
                .set_syslog(&self.syslog_ident, &self.syslog_facility)?;
        }
        Ok(())
    }

    /// `including` holds the canonical paths of the files whose `include`
    /// led here; a file that shows up again is a cycle.
    fn parse_lines(
        &mut self,
        fname: &str,
        including: &mut Vec<PathBuf>,
    ) -> Result<(), ConfigError> {
        let path = Path::new(fname).canonicalize()?;
        if including.contains(&path) {
            return Err(ConfigError::InvalidParameter);
        }
        let file = BufReader::new(File::open(&path)?);
        including.push(path);
        for line_iter in file.lines() {
            let lline = line_iter?;
            let line = lline.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let args = splitargs(line.as_bytes())?;
            if args.is_empty() {
                continue;
            }
            match &*args[0] {
                b"loglevel" => self.logger.set_loglevel(read_parse::<Level>(&args)?),
                b"logfile" => {
                    let logfile = read_string(&args)?;
                    if !logfile.is_empty() {
                        self.logger.set_logfile(&logfile)?;
                    }
                }
                b"syslog-enabled" => self.syslog_enabled = read_bool(&args)?,
                b"syslog-ident" => self.syslog_ident = read_string(&args)?,
                b"syslog-facility" => self.syslog_facility = read_string(&args)?,
                b"pidfile" => self.pidfile = Some(read_string(&args)?),
                b"include" => {
                    let path = read_string(&args)?;
                    self.parse_lines(&path, including)?;
                }
                other => {
                    return Err(ConfigError::UnknownOption(
                        String::from_utf8_lossy(other).into_owned(),
                    ))
                }
            };
        }

        including.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::random;
    use std::fs::create_dir_all;
    use std::fs::File;
    use std::io::Write;
    use std::sync::mpsc::{channel, Receiver};

    use util::mstime;

    fn write_config(content: &[u8]) -> String {
        let dirpath = format!("tmp/{}", mstime());
        let filepath = format!("{}/{}.conf", dirpath, random::<u64>());
        create_dir_all(&dirpath).unwrap();
        File::create(&filepath).unwrap().write_all(content).unwrap();
        filepath
    }

    macro_rules! config {
        ($str: expr) => {{
            let (tx, rx) = channel();
            let mut config = Config::new(Logger::channel(Level::Notice, tx));
            config.parsefile(&write_config($str)).unwrap();
            (config, rx)
        }};
    }

    fn lines(config: &Config, rx: &Receiver<Vec<u8>>) -> Vec<String> {
        config.logger.sync();
        rx.try_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    #[test]
    fn parse_pidfile() {
        let (config, _) = config!(b"pidfile /var/run/pidprovider.pid");
        assert_eq!(config.pidfile, Some("/var/run/pidprovider.pid".to_owned()));
    }

    #[test]
    fn parse_pidfile_quotes() {
        let (config, _) = config!(b"pidfile \"/tmp/my app.pid\"");
        assert_eq!(config.pidfile, Some("/tmp/my app.pid".to_owned()));
    }

    #[test]
    fn parse_no_pidfile() {
        let (config, _) = config!(b"# nothing here\n\n");
        assert_eq!(config.pidfile, None);
        assert!(!config.syslog_enabled);
    }

    #[test]
    fn parse_loglevel() {
        let (config, rx) = config!(b"loglevel debug");
        config.logger.log(Level::Debug, "visible".to_owned());
        let lines = lines(&config, &rx);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" . visible\n"));
    }

    #[test]
    fn parse_loglevel_warning() {
        let (config, rx) = config!(b"loglevel warning");
        config.logger.log(Level::Notice, "hidden".to_owned());
        assert!(lines(&config, &rx).is_empty());
    }

    #[test]
    fn parse_syslog_options() {
        let (config, _) = config!(b"syslog-enabled no\nsyslog-ident myapp\nsyslog-facility local3");
        assert!(!config.syslog_enabled);
        assert_eq!(config.syslog_ident, "myapp");
        assert_eq!(config.syslog_facility, "local3");
    }

    #[test]
    fn parse_include() {
        let included = write_config(b"pidfile /tmp/included.pid");
        let (config, _) = config!(format!("include {}", included).as_bytes());
        assert_eq!(config.pidfile, Some("/tmp/included.pid".to_owned()));
    }

    #[test]
    fn parse_logfile() {
        let logfile = format!("{}.log", write_config(b""));
        let (config, _) = config!(format!("logfile {}\nloglevel verbose", logfile).as_bytes());
        config.logger.log(Level::Verbose, "into the file".to_owned());
        config.logger.sync();
        let content = std::fs::read_to_string(&logfile).unwrap();
        assert!(content.ends_with(" - into the file\n"));
    }

    #[test]
    fn parse_unknown_option() {
        let mut config = Config::new(Logger::new(Level::Warning));
        match config.parsefile(&write_config(b"port 6379")) {
            Err(ConfigError::UnknownOption(name)) => assert_eq!(name, "port"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_invalid_bool() {
        let mut config = Config::new(Logger::new(Level::Warning));
        match config.parsefile(&write_config(b"syslog-enabled maybe")) {
            Err(ConfigError::InvalidFormat) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_invalid_level() {
        let mut config = Config::new(Logger::new(Level::Warning));
        match config.parsefile(&write_config(b"loglevel loud")) {
            Err(ConfigError::InvalidParameter) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_missing_file() {
        let mut config = Config::new(Logger::new(Level::Warning));
        match config.parsefile("tmp/does/not/exist.conf") {
            Err(ConfigError::IOError(_)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_include_self() {
        let path = write_config(b"");
        File::create(&path)
            .unwrap()
            .write_all(format!("pidfile /tmp/a.pid\ninclude {}\n", path).as_bytes())
            .unwrap();
        let mut config = Config::new(Logger::new(Level::Warning));
        match config.parsefile(&path) {
            Err(ConfigError::InvalidParameter) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_include_cycle() {
        let first = write_config(b"");
        let second = write_config(format!("include {}", first).as_bytes());
        File::create(&first)
            .unwrap()
            .write_all(format!("include {}", second).as_bytes())
            .unwrap();
        let mut config = Config::new(Logger::new(Level::Warning));
        match config.parsefile(&first) {
            Err(ConfigError::InvalidParameter) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_include_twice() {
        let included = write_config(b"syslog-ident twice");
        let (config, _) = config!(format!("include {}\ninclude {}", included, included).as_bytes());
        assert_eq!(config.syslog_ident, "twice");
    }
}
