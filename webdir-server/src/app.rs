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

//! Pingora server setup

use async_trait::async_trait;
use http::Response;
use log::info;
use pingora_core::apps::http_app::ServeHttp;
use pingora_core::protocols::http::ServerSession;
use pingora_core::server::Server;
use pingora_core::services::listening::Service;

use dir_listing_module::DirListingHandler;

use crate::configuration::ServerConf;

/// HTTP app delegating every request to the directory listing handler. Requests
/// are processed concurrently, the handler is shared read-only.
#[derive(Debug)]
pub(crate) struct DirServerApp {
    handler: DirListingHandler,
}

impl DirServerApp {
    pub(crate) fn new(handler: DirListingHandler) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl ServeHttp for DirServerApp {
    async fn response(&self, session: &mut ServerSession) -> Response<Vec<u8>> {
        let header = session.req_header();
        self.handler
            .handle(&header.method, &header.uri, &header.headers)
    }
}

/// Sets up a server listening on the configured addresses. The caller owns the
/// returned server and decides when to run it; shutdown and connection draining
/// are handled by the pingora runtime.
pub(crate) fn into_server(
    conf: &ServerConf,
    app: DirServerApp,
) -> Result<Server, Box<pingora_core::Error>> {
    let mut server = Server::new(None)?;
    server.bootstrap();

    let mut service = Service::new("directory server".to_owned(), app);
    for addr in &conf.listen {
        info!("listening on {addr}");
        service.add_tcp(addr);
    }
    server.add_service(service);

    Ok(server)
}
