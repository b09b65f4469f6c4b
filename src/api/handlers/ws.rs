// src/api/handlers/ws.rs
use actix::{Actor, StreamHandler, Handler, Message, Addr, AsyncContext};
use actix_web::{web, HttpRequest, HttpResponse, Error};
use actix_web_actors::ws;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::AppState;
use crate::poller::{RenderListener, TableUpdate, ViewerPresence};

/// Sent to every connected viewer after a newer job list has been rendered.
#[derive(Message, Clone, Serialize)]
#[rtype(result = "()")]
pub struct ViewerUpdate {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(flatten)]
    pub update: TableUpdate,
}

/// Tracks websocket viewers. While any are connected the job table counts as visible.
#[derive(Clone)]
pub struct WsBroker {
    clients: Arc<RwLock<Vec<Addr<WsConnection>>>>,
    presence: Arc<ViewerPresence>,
}

impl WsBroker {
    pub fn new(presence: Arc<ViewerPresence>) -> Self {
        Self {
            clients: Arc::new(RwLock::new(Vec::new())),
            presence,
        }
    }

    pub async fn register(&self, id: Uuid, addr: Addr<WsConnection>) {
        let mut clients = self.clients.write().await;
        clients.push(addr);
        let viewers = self.presence.connect();
        log::debug!("Viewer {} connected ({} watching)", id, viewers);
    }

    pub async fn unregister(&self, id: Uuid, addr: &Addr<WsConnection>) {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|c| c != addr);
        if clients.len() < before {
            let viewers = self.presence.disconnect();
            log::debug!("Viewer {} disconnected ({} watching)", id, viewers);
        }
    }

    pub async fn broadcast(&self, msg: ViewerUpdate) {
        let clients = self.clients.read().await;
        for client in clients.iter() {
            client.do_send(msg.clone());
        }
    }
}

#[async_trait]
impl RenderListener for WsBroker {
    async fn table_rendered(&self, update: TableUpdate) {
        self.broadcast(ViewerUpdate { kind: "table", update }).await;
    }
}

pub struct WsConnection {
    id: Uuid,
    broker: WsBroker,
}

impl WsConnection {
    pub fn new(broker: WsBroker) -> Self {
        Self {
            id: Uuid::new_v4(),
            broker,
        }
    }
}

impl Actor for WsConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let broker = self.broker.clone();
        let id = self.id;
        actix::spawn(async move {
            broker.register(id, addr).await;
        });
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let broker = self.broker.clone();
        let id = self.id;
        actix::spawn(async move {
            broker.unregister(id, &addr).await;
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => ctx.close(reason),
            _ => (),
        }
    }
}

impl Handler<ViewerUpdate> for WsConnection {
    type Result = ();

    fn handle(&mut self, msg: ViewerUpdate, ctx: &mut Self::Context) {
        if let Ok(json) = serde_json::to_string(&msg) {
            ctx.text(json);
        }
    }
}

/// Upgrades to a websocket and sends the current table straight away.
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    broker: web::Data<WsBroker>,
) -> Result<HttpResponse, Error> {
    let initial = {
        let table = state.table.read().await;
        table.sequence().map(|_| TableUpdate::from_table(&table))
    };

    let conn = WsConnection::new(broker.get_ref().clone());
    let (addr, response) = ws::WsResponseBuilder::new(conn, &req, stream).start_with_addr()?;
    if let Some(update) = initial {
        addr.do_send(ViewerUpdate { kind: "table", update });
    }
    Ok(response)
}
