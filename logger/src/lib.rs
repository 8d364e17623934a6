use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{stderr, stdout, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use compat::current_process_id;
use thiserror::Error;

/// Macro to log a message. Uses the `format!` syntax.
/// See `std::fmt` for more information.
///
/// # Examples
///
/// ```
/// # #[macro_use(log)]
/// # extern crate logger;
/// # use logger::{Logger, Level};
/// #
/// # fn main() {
/// # let logger = Logger::new(Level::Warning);
/// log!(logger, Debug, "hello {}", "world");
/// # }
/// ```
#[macro_export]
macro_rules! log {
    ($logger: expr, $level: ident, $($arg:tt)*) => ({
        $logger.log($crate::Level::$level, format!($($arg)*))
    })
}

/// Macro to send a message to a `Sender<(Level, String)>`.
/// Uses the `format!` syntax.
/// See `std::fmt` for more information.
///
/// # Examples
///
/// ```
/// # #[macro_use(sendlog)]
/// # extern crate logger;
/// # use logger::{Logger, Level};
/// # use std::sync::mpsc::channel;
/// #
/// # fn main() {
/// # let (tx, rx) = channel();
/// # let logger = Logger::channel(Level::Debug, tx);
/// # let sender = logger.sender();
/// sendlog!(sender, Debug, "hello {}", "world");
/// # assert!(rx.recv().unwrap().ends_with(b" . hello world\n"));
/// # }
/// ```
#[macro_export]
macro_rules! sendlog {
    ($sender: expr, $level: ident, $($arg:tt)*) => ({
        $sender.send(($crate::Level::$level, format!($($arg)*)))
    })
}

enum Output {
    /// Sends each log line to a channel
    Channel(Sender<Vec<u8>>),
    /// Writes to the standard output
    Stdout,
    /// Writes to the standard error
    Stderr,
    /// Appends to a `File` in `String` path
    File(File, String),
}

impl fmt::Debug for Output {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Output::Channel(_) => fmt.write_str("Channel"),
            Output::Stderr => fmt.write_str("Stderr"),
            Output::Stdout => fmt.write_str("Stdout"),
            Output::File(_, ref filename) => write!(fmt, "File: {}", filename),
        }
    }
}

impl Write for Output {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match *self {
            Output::Channel(ref v) => match v.send(data.to_vec()) {
                Ok(_) => Ok(data.len()),
                Err(_) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "log channel closed")),
            },
            Output::Stderr => stderr().write(data),
            Output::Stdout => stdout().write(data),
            Output::File(ref mut v, _) => v.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            Output::Channel(_) => Ok(()),
            Output::Stderr => stderr().flush(),
            Output::Stdout => stdout().flush(),
            Output::File(ref mut v, _) => v.flush(),
        }
    }
}

impl Output {
    fn open(path: &str) -> io::Result<Output> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(Path::new(path))?;
        Ok(Output::File(file, path.to_owned()))
    }
}

/// A level that identifies a log message.
/// A lower level includes all higher levels.
#[derive(PartialEq, Clone, Debug)]
pub enum Level {
    Debug,
    Verbose,
    Notice,
    Warning,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level {0:?}")]
pub struct ParseLevelError(String);

impl Level {
    /// Whether the level is equal or lower than another level.
    /// For example, `Debug` includes all other levels, while `Warning` only
    /// includes itself.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logger::Level;
    /// #
    /// assert!(Level::Debug.contains(&Level::Debug));
    /// assert!(!Level::Warning.contains(&Level::Debug));
    /// assert!(Level::Debug.contains(&Level::Warning));
    /// ```
    pub fn contains(&self, other: &Level) -> bool {
        match *self {
            Level::Debug => true,
            Level::Verbose => *other != Level::Debug,
            Level::Notice => *other == Level::Notice || *other == Level::Warning,
            Level::Warning => *other == Level::Warning,
        }
    }

    /// Single character shown between the timestamp and the message.
    pub fn marker(&self) -> char {
        match *self {
            Level::Debug => '.',
            Level::Verbose => '-',
            Level::Notice => '*',
            Level::Warning => '#',
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Level, ParseLevelError> {
        Ok(match &*s.to_ascii_lowercase() {
            "debug" => Level::Debug,
            "verbose" => Level::Verbose,
            "notice" => Level::Notice,
            "warning" => Level::Warning,
            _ => return Err(ParseLevelError(s.to_owned())),
        })
    }
}

#[cfg(unix)]
type Syslog = syslog::Logger<syslog::LoggerBackend, syslog::Formatter3164>;

enum Message {
    Output(Output),
    Level(Level),
    Log(Level, String),
    #[cfg(unix)]
    Syslog(Option<Syslog>),
    /// Answered once every message queued before it was handled.
    Sync(Sender<()>),
}

/// Formats a line as `<pid>:M <date> <marker> <message>`.
fn format_line(level: &Level, msg: &str) -> String {
    let now = time::now();
    let stamp = time::strftime("%d %b %H:%M:%S", &now).unwrap_or_default();
    format!(
        "{}:M {}.{:03} {} {}\n",
        current_process_id(),
        stamp,
        now.tm_nsec / 1_000_000,
        level.marker(),
        msg
    )
}

#[cfg(unix)]
fn send_syslog(writer: &mut Syslog, level: &Level, msg: &str) -> Result<(), String> {
    match *level {
        Level::Debug => writer.debug(msg),
        Level::Verbose => writer.info(msg),
        Level::Notice => writer.notice(msg),
        Level::Warning => writer.warning(msg),
    }
    .map_err(|e| e.to_string())
}

struct Writer {
    level: Level,
    output: Output,
    #[cfg(unix)]
    syslog: Option<Syslog>,
}

impl Writer {
    fn write(&mut self, level: Level, msg: String) {
        if !self.level.contains(&level) {
            return;
        }
        let line = format_line(&level, &msg);
        if let Err(e) = self.output.write_all(line.as_bytes()) {
            // failing to log a message... will write straight to stderr
            let _ = write!(stderr(), "Failed to log {:?} {}", e, line);
        }
        #[cfg(unix)]
        {
            if let Some(ref mut w) = self.syslog {
                if let Err(e) = send_syslog(w, &level, &msg) {
                    let _ = writeln!(stderr(), "Failed to syslog {} {}", e, msg);
                }
            }
        }
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Output(output) => self.output = output,
            Message::Level(level) => self.level = level,
            Message::Log(level, msg) => self.write(level, msg),
            #[cfg(unix)]
            Message::Syslog(writer) => self.syslog = writer,
            Message::Sync(done) => {
                let _ = self.output.flush();
                let _ = done.send(());
            }
        }
    }
}

enum Sink {
    /// A writer thread drains the channel.
    Thread(Sender<Message>),
    /// No thread could be spawned (e.g. wasi); callers write themselves.
    Inline(Arc<Mutex<Writer>>),
}

impl Clone for Sink {
    fn clone(&self) -> Self {
        match *self {
            Sink::Thread(ref tx) => Sink::Thread(tx.clone()),
            Sink::Inline(ref w) => Sink::Inline(w.clone()),
        }
    }
}

/// Handle to a background thread that writes log lines. Cloned handles
/// share the same thread, level and output. Where threads are not available
/// lines are written by the caller instead.
#[derive(Clone)]
pub struct Logger {
    sink: Sink,
}

impl Logger {
    /// Creates a new `Logger` for a given `Output` and severity `Level`.
    fn create(level: Level, output: Output) -> Logger {
        let writer = Arc::new(Mutex::new(Writer {
            level,
            output,
            #[cfg(unix)]
            syslog: None,
        }));
        let (tx, rx) = channel::<Message>();
        let shared = writer.clone();
        let spawned = thread::Builder::new()
            .name("logger".to_owned())
            .spawn(move || {
                for message in rx {
                    if let Ok(mut w) = shared.lock() {
                        w.handle(message);
                    }
                }
            });
        match spawned {
            Ok(_) => Logger {
                sink: Sink::Thread(tx),
            },
            Err(_) => Logger::inline(writer),
        }
    }

    fn inline(writer: Arc<Mutex<Writer>>) -> Logger {
        Logger {
            sink: Sink::Inline(writer),
        }
    }

    fn send(&self, message: Message) {
        match self.sink {
            Sink::Thread(ref tx) => {
                let _ = tx.send(message);
            }
            Sink::Inline(ref writer) => {
                if let Ok(mut w) = writer.lock() {
                    w.handle(message);
                }
            }
        }
    }

    /// Creates a new logger that writes in the standard output.
    ///
    /// # Examples
    /// ```
    /// # use logger::{Logger, Level};
    /// #
    /// let logger = Logger::new(Level::Warning);
    /// logger.log(Level::Warning, "hello world".to_owned());
    /// ```
    pub fn new(level: Level) -> Self {
        Self::create(level, Output::Stdout)
    }

    /// Creates a new logger that writes in the standard error.
    pub fn new_err(level: Level) -> Self {
        Self::create(level, Output::Stderr)
    }

    /// Creates a new logger that sends each formatted line to `s`.
    ///
    /// # Examples
    /// ```
    /// # use logger::{Logger, Level};
    /// # use std::sync::mpsc::channel;
    /// #
    /// let (tx, rx) = channel();
    /// let logger = Logger::channel(Level::Debug, tx);
    /// logger.log(Level::Notice, "hello world".to_owned());
    /// let line = rx.recv().unwrap();
    /// let pid = compat::current_process_id();
    /// assert!(line.starts_with(format!("{}:M ", pid).as_bytes()));
    /// assert!(line.ends_with(b" * hello world\n"));
    /// ```
    pub fn channel(level: Level, s: Sender<Vec<u8>>) -> Self {
        Self::create(level, Output::Channel(s))
    }

    /// Creates a new logger that appends to a file.
    pub fn file(level: Level, path: &str) -> io::Result<Self> {
        Ok(Self::create(level, Output::open(path)?))
    }

    /// Disables syslog
    #[cfg(unix)]
    pub fn disable_syslog(&mut self) {
        self.send(Message::Syslog(None));
    }

    #[cfg(not(unix))]
    pub fn disable_syslog(&mut self) {}

    /// Enables syslog. Records carry `ident` as the process name and the
    /// current process id.
    #[cfg(unix)]
    pub fn set_syslog(&mut self, ident: &str, facility: &str) -> io::Result<()> {
        let formatter = syslog::Formatter3164 {
            facility: match &*facility.to_ascii_lowercase() {
                "local0" => syslog::Facility::LOG_LOCAL0,
                "local1" => syslog::Facility::LOG_LOCAL1,
                "local2" => syslog::Facility::LOG_LOCAL2,
                "local3" => syslog::Facility::LOG_LOCAL3,
                "local4" => syslog::Facility::LOG_LOCAL4,
                "local5" => syslog::Facility::LOG_LOCAL5,
                "local6" => syslog::Facility::LOG_LOCAL6,
                "local7" => syslog::Facility::LOG_LOCAL7,
                _ => syslog::Facility::LOG_USER,
            },
            hostname: None,
            process: ident.to_owned(),
            pid: current_process_id() as _,
        };
        let writer = syslog::unix(formatter)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        self.send(Message::Syslog(Some(writer)));
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn set_syslog(&mut self, _: &str, _: &str) -> io::Result<()> {
        Ok(())
    }

    /// Changes the output to be a file in `path`.
    pub fn set_logfile(&mut self, path: &str) -> io::Result<()> {
        let output = Output::open(path)?;
        self.send(Message::Output(output));
        Ok(())
    }

    /// Changes the log level.
    pub fn set_loglevel(&mut self, level: Level) {
        self.send(Message::Level(level));
    }

    /// Creates a new sender to log messages. If no forwarding thread can be
    /// spawned the returned sender is disconnected and `send` fails.
    pub fn sender(&self) -> Sender<(Level, String)> {
        let (tx, rx) = channel::<(Level, String)>();
        let logger = self.clone();
        let _ = thread::Builder::new()
            .name("logger-sender".to_owned())
            .spawn(move || {
                for (level, message) in rx {
                    logger.log(level, message);
                }
            });
        tx
    }

    /// Logs a message with a log level.
    pub fn log(&self, level: Level, msg: String) {
        self.send(Message::Log(level, msg));
    }

    /// Blocks until every message logged so far has been written.
    pub fn sync(&self) {
        let (tx, rx) = channel();
        self.send(Message::Sync(tx));
        let _ = rx.recv();
    }
}
