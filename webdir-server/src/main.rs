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

#![doc = include_str!("../README.md")]

mod app;
mod configuration;

use clap::Parser;
use log::error;
use std::sync::Arc;

use dir_listing_module::DirListingHandler;
use path_filter::FilterRules;
use vfs_backend::DiskBackend;

use crate::app::{into_server, DirServerApp};
use crate::configuration::{ServerConf, ServerOpt};

fn main() {
    env_logger::init();

    let opt = ServerOpt::parse();

    let mut conf = match &opt.conf {
        Some(path) => match ServerConf::load_from_file(path) {
            Ok(conf) => conf,
            Err(err) => {
                error!("{err}");
                return;
            }
        },
        None => ServerConf::default(),
    };
    conf.merge_with_opt(opt);

    let backend = match DiskBackend::new(&conf.root) {
        Ok(backend) => backend,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    let filter = match FilterRules::from_rules(&conf.filter) {
        Ok(filter) => filter,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    let handler = DirListingHandler::new(Arc::new(backend), Arc::new(filter));

    let server = match into_server(&conf, DirServerApp::new(handler)) {
        Ok(server) => server,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    server.run_forever();
}
