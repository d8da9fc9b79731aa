use std::io::Write;

use log::{Level, LevelFilter};

/// Installs the crate logger and hands back the receiving end of its records.
pub fn init_logger(level: LevelFilter) -> anyhow::Result<flume::Receiver<Record>> {
    log::set_max_level(level);
    let (sender, receiver) = flume::unbounded();
    log::set_boxed_logger(Box::new(Logger::new(sender)))?;
    Ok(receiver)
}

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct DisplayOptions {
    pub timestamp: bool,
    pub level: bool,
    pub target: bool,
    pub index: bool,
}

impl DisplayOptions {
    pub const fn new() -> Self {
        Self {
            timestamp: true,
            level: true,
            target: true,
            index: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            timestamp: false,
            level: false,
            target: false,
            index: false,
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Record {
    pub timestamp: time::OffsetDateTime,
    pub start: time::OffsetDateTime,
    pub target: Box<str>,
    pub level: Level,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub data: Box<str>,
}

impl Record {
    const fn level(&self) -> &'static str {
        match self.level {
            Level::Error => "error",
            Level::Warn => "warn ",
            Level::Info => "info ",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }

    /// Milliseconds since the logger started, grouped as `000.000.000`
    fn elapsed(&self) -> String {
        let ts = format!("{:0>9}", (self.timestamp - self.start).whole_milliseconds());
        if ts.len() != 9 {
            return ts;
        }

        ts.as_bytes()
            .chunks(3)
            .map(|chunk| std::str::from_utf8(chunk).expect("ascii digits"))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn display(
        &self,
        opts: DisplayOptions,
        index: usize,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        let DisplayOptions {
            timestamp,
            level,
            target,
            index: show_index,
        } = opts;

        let mut header = Vec::with_capacity(4);
        if show_index {
            header.push(index.to_string());
        }
        if level {
            header.push(self.level().to_string());
        }
        if timestamp {
            header.push(self.elapsed());
        }
        if target {
            header.push(self.target.to_string());
        }

        match header.len() {
            0 => writeln!(out, "{}", self.data),
            1 => writeln!(out, "{} {}", header[0], self.data),
            _ => {
                writeln!(out, "{}", header.join(" "))?;
                writeln!(out, "    {}", self.data)
            }
        }
    }

    pub fn location(&self) -> Option<String> {
        let (file, line) = self.file.and_then(|file| Some((file, self.line?)))?;
        Some(format!("{file}:{line}"))
    }
}

struct Logger {
    sender: flume::Sender<Record>,
    start: time::OffsetDateTime,
}

impl Logger {
    fn new(sender: flume::Sender<Record>) -> Self {
        Self {
            sender,
            start: now(),
        }
    }

    fn log_it(&self, record: &log::Record<'_>) {
        let metadata = record.metadata();
        let args = record.args();

        let _ = self.sender.send(Record {
            timestamp: now(),
            start: self.start,
            target: Box::from(metadata.target()),
            level: metadata.level(),
            data: Box::from(&*args.to_string()),
            file: record.file_static(),
            line: record.line(),
        });
    }

    fn is_from_our_pkg(record: &log::Record<'_>) -> bool {
        record
            .module_path()
            .map(|module| module.split_once("::").map_or(module, |(head, _)| head))
            .filter(|&head| head == env!("CARGO_PKG_NAME"))
            .is_some()
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !Self::is_from_our_pkg(record) {
            return;
        }

        self.log_it(record)
    }

    fn flush(&self) {}
}

// the local offset can't always be determined (e.g. once other threads exist)
fn now() -> time::OffsetDateTime {
    time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use log::{Level, Log};

    use super::{DisplayOptions, Logger, Record};

    fn record(level: Level, data: &str, millis: i64) -> Record {
        let start = time::OffsetDateTime::UNIX_EPOCH;
        Record {
            timestamp: start + time::Duration::milliseconds(millis),
            start,
            target: Box::from("circq::queue"),
            level,
            file: Some("src/queue.rs"),
            line: Some(42),
            data: Box::from(data),
        }
    }

    fn render(record: &Record, opts: DisplayOptions, index: usize) -> String {
        let mut out = Vec::new();
        record.display(opts, index, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn filters_foreign_modules() {
        let (tx, rx) = flume::unbounded();
        let logger = Logger::new(tx);

        logger.log(
            &log::Record::builder()
                .args(format_args!("resized from 2 to 4 slots"))
                .level(Level::Trace)
                .target("circq::queue")
                .module_path(Some("circq::queue"))
                .file_static(Some("src/queue.rs"))
                .line(Some(7))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .args(format_args!("not ours"))
                .level(Level::Info)
                .module_path(Some("flume::signal"))
                .build(),
        );

        let records = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(records.len(), 1);
        assert_eq!(&*records[0].data, "resized from 2 to 4 slots");
        assert_eq!(records[0].level, Level::Trace);
        assert_eq!(records[0].location().as_deref(), Some("src/queue.rs:7"));
    }

    #[test]
    fn display_full() {
        let record = record(Level::Info, "soak finished", 1_234_567);
        assert_eq!(
            render(&record, DisplayOptions::default(), 3),
            "3 info  001.234.567 circq::queue\n    soak finished\n"
        );
    }

    #[test]
    fn display_single_field() {
        let record = record(Level::Warn, "hello", 5);
        let opts = DisplayOptions {
            level: true,
            ..DisplayOptions::none()
        };
        assert_eq!(render(&record, opts, 0), "warn  hello\n");
        assert_eq!(render(&record, DisplayOptions::none(), 0), "hello\n");
    }

    #[test]
    fn elapsed_overflowing_nine_digits() {
        let record = record(Level::Debug, "", 1_000_000_000);
        assert_eq!(record.elapsed(), "1000000000");
    }
}
