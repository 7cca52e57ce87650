// Diagnostics page registry
//
// Read-only status pages for an embedded debug server. The registry is
// built once per process and handed to whatever serves the pages; nothing
// here touches scanner state. Two pages are installed by default: the
// tail of the process log and a dump of every runtime flag.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use log::warn;

use crate::config::Flags;

type PageCallback = Box<dyn Fn(&mut String) + Send + Sync>;

struct Page {
    path: String,
    title: String,
    callback: PageCallback,
}

/// Named set of read-only diagnostics pages.
pub struct DiagnosticsRegistry {
    pages: Vec<Page>,
}

impl DiagnosticsRegistry {
    /// A registry pre-loaded with the default log-tail and flag-dump pages.
    pub fn new(flags: &Flags) -> Self {
        let mut registry = DiagnosticsRegistry { pages: Vec::new() };

        let log_path = flags.log_path.clone();
        let budget = flags.web_log_bytes;
        registry.register("/logs", "Log tail", move |out| {
            append_log_tail(&log_path, budget, out);
        });

        let flags = flags.clone();
        registry.register("/flags", "Command-line flags", move |out| {
            for (name, value) in flags.entries() {
                out.push_str(name);
                out.push('=');
                out.push_str(&value);
                out.push('\n');
            }
        });

        registry
    }

    /// Install (or replace) the page served at `path`.
    pub fn register(
        &mut self,
        path: &str,
        title: &str,
        callback: impl Fn(&mut String) + Send + Sync + 'static,
    ) {
        let page = Page {
            path: path.to_string(),
            title: title.to_string(),
            callback: Box::new(callback),
        };
        match self.pages.iter_mut().find(|existing| existing.path == path) {
            Some(existing) => *existing = page,
            None => self.pages.push(page),
        }
    }

    /// Render the page at `path`, or `None` if no page is registered there.
    pub fn render(&self, path: &str) -> Option<String> {
        let page = self.pages.iter().find(|page| page.path == path)?;
        let mut out = String::new();
        (page.callback)(&mut out);
        Some(out)
    }

    /// (path, title) of every registered page, in registration order.
    pub fn pages(&self) -> Vec<(&str, &str)> {
        self.pages
            .iter()
            .map(|page| (page.path.as_str(), page.title.as_str()))
            .collect()
    }
}

/// Append at most `budget` bytes from the end of the log at `path`.
fn append_log_tail(path: &Path, budget: u64, out: &mut String) {
    match read_tail(path, budget) {
        Ok((bytes, file_size)) => {
            if file_size > budget {
                out.push_str(&format!(
                    "showing last {budget} of {file_size} log bytes\n"
                ));
            }
            out.push_str(&String::from_utf8_lossy(&bytes));
        }
        Err(err) => {
            warn!("diagnostics log page: {} unreadable: {err}", path.display());
            out.push_str(&format!(
                "could not read log file {}: {err}\n",
                path.display()
            ));
        }
    }
}

fn read_tail(path: &Path, budget: u64) -> io::Result<(Vec<u8>, u64)> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();
    if file_size > budget {
        file.seek(SeekFrom::Start(file_size - budget))?;
    }
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok((bytes, file_size))
}
