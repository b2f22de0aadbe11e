// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Data structures required for server configuration

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command line options of the directory server
#[derive(Debug, Default, Parser)]
pub(crate) struct ServerOpt {
    /// Address and port to listen on, e.g. "127.0.0.1:8080". This command line
    /// flag can be specified multiple times.
    #[clap(short, long)]
    pub(crate) listen: Option<Vec<String>>,

    /// The root directory to serve.
    #[clap(short, long)]
    pub(crate) root: Option<PathBuf>,

    /// Filter rule such as "- hidden.txt" or "- hidden/**". This command line
    /// flag can be specified multiple times, earlier rules win.
    #[clap(short, long)]
    pub(crate) filter: Option<Vec<String>>,

    /// The path to the configuration file.
    #[clap(short, long)]
    pub(crate) conf: Option<PathBuf>,
}

/// Configuration file settings of the directory server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ServerConf {
    /// List of address/port combinations to listen on, e.g. "127.0.0.1:8080".
    pub(crate) listen: Vec<String>,

    /// The root directory to serve.
    pub(crate) root: PathBuf,

    /// Filter rules deciding which paths are hidden, one rule per entry.
    pub(crate) filter: Vec<String>,
}

impl Default for ServerConf {
    fn default() -> Self {
        Self {
            listen: Vec::new(),
            root: PathBuf::from("."),
            filter: Vec::new(),
        }
    }
}

impl ServerConf {
    /// Reads the configuration from a YAML file.
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfError> {
        let file = std::fs::File::open(path).map_err(|err| ConfError::Read {
            path: path.to_path_buf(),
            source: err,
        })?;
        serde_yaml::from_reader(file).map_err(|err| ConfError::Parse {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Merges the command line options into the current configuration. Any
    /// command line options present overwrite existing settings.
    pub(crate) fn merge_with_opt(&mut self, opt: ServerOpt) {
        if let Some(listen) = opt.listen {
            self.listen = listen;
        }

        if let Some(root) = opt.root {
            self.root = root;
        }

        if let Some(filter) = opt.filter {
            self.filter = filter;
        }

        if self.listen.is_empty() {
            // Make certain we have a listening address
            self.listen.push("127.0.0.1:8080".to_owned());
        }
    }
}

/// Error type produced when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfError {
    /// The configuration file could not be read.
    #[error("failed reading configuration file {path}: {source}")]
    Read {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("failed parsing configuration file {path}: {source}")]
    Parse {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}
