use std::thread;

use anyhow::{Context as _, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use ims_client::InteractionApi;
use ims_core::{
    Interaction, InteractionId, InteractionPage, ListTicket, Site, SiteId, SubmitFailure,
    SubmitRequest,
};

/// Requests the app queues for the API worker.
#[derive(Debug, Clone)]
pub enum Action {
    LoadSites,
    LoadList(ListTicket),
    LoadRecord(SiteId, InteractionId),
    Submit(SiteId, SubmitRequest),
    Delete(SiteId, InteractionId),
}

/// Worker answers. Each carries enough to tell whether the app still cares.
#[derive(Debug)]
pub enum Reply {
    Sites(Result<Vec<Site>, String>),
    List(ListTicket, Result<InteractionPage, String>),
    Record(InteractionId, Result<Interaction, String>),
    Submitted(Result<Interaction, SubmitFailure>),
    Deleted(InteractionId, Result<(), String>),
}

pub fn execute_action(api: &dyn InteractionApi, action: Action) -> Reply {
    match action {
        Action::LoadSites => Reply::Sites(api.list_sites().map_err(|err| err.to_string())),
        Action::LoadList(ticket) => {
            let result = api
                .list_interactions(ticket.params())
                .map_err(|err| err.to_string());
            Reply::List(ticket, result)
        }
        Action::LoadRecord(site_id, id) => {
            let result = api
                .get_interaction(site_id, id)
                .map_err(|err| err.to_string());
            Reply::Record(id, result)
        }
        Action::Submit(site_id, request) => {
            let result = match &request {
                SubmitRequest::Create(payload) => api.create_interaction(site_id, payload),
                SubmitRequest::Update(id, payload) => {
                    api.update_interaction(site_id, *id, payload)
                }
            };
            Reply::Submitted(result.map_err(|err| err.submit_failure()))
        }
        Action::Delete(site_id, id) => {
            let result = api
                .delete_interaction(site_id, id)
                .map_err(|err| err.to_string());
            Reply::Deleted(id, result)
        }
    }
}

/// Runs API calls off the UI thread, one at a time, in the order queued.
pub struct Worker {
    actions: Sender<Action>,
    replies: Receiver<Reply>,
}

impl Worker {
    pub fn spawn(api: Box<dyn InteractionApi>) -> Result<Self> {
        let (action_tx, action_rx) = unbounded::<Action>();
        let (reply_tx, reply_rx) = unbounded::<Reply>();
        thread::Builder::new()
            .name("ims-api".to_string())
            .spawn(move || {
                while let Ok(action) = action_rx.recv() {
                    let reply = execute_action(api.as_ref(), action);
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
            })
            .with_context(|| "spawn api worker")?;
        Ok(Self {
            actions: action_tx,
            replies: reply_rx,
        })
    }

    pub fn send(&self, action: Action) -> Result<()> {
        self.actions
            .send(action)
            .map_err(|_| anyhow::anyhow!("api worker stopped"))
    }

    pub fn try_recv(&self) -> Option<Reply> {
        self.replies.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{execute_action, Action, Reply, Worker};
    use ims_client::MemoryApi;
    use ims_core::{FinderDefaults, FinderQuery, InteractionId, ListState, SiteId};
    use std::time::{Duration, Instant};

    #[test]
    fn list_reply_keeps_its_ticket() {
        let api = MemoryApi::demo();
        let query = FinderQuery::new(SiteId::new(2), FinderDefaults::default());
        let mut list = ListState::new();
        let ticket = list.begin(&query);

        match execute_action(&api, Action::LoadList(ticket.clone())) {
            Reply::List(returned, Ok(page)) => {
                assert_eq!(returned, ticket);
                assert_eq!(page.total, 8);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_record_is_an_error_reply() {
        let api = MemoryApi::demo();
        let reply = execute_action(&api, Action::LoadRecord(SiteId::new(1), InteractionId::new(999)));
        assert!(matches!(reply, Reply::Record(_, Err(_))));
    }

    #[test]
    fn worker_answers_in_order() {
        let worker = Worker::spawn(Box::new(MemoryApi::demo())).expect("spawn");
        worker.send(Action::LoadSites).expect("send");
        worker
            .send(Action::Delete(SiteId::new(1), InteractionId::new(1)))
            .expect("send");

        let mut replies = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while replies.len() < 2 && Instant::now() < deadline {
            match worker.try_recv() {
                Some(reply) => replies.push(reply),
                None => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        assert!(matches!(replies[0], Reply::Sites(Ok(ref sites)) if sites.len() == 2));
        assert!(matches!(replies[1], Reply::Deleted(_, Ok(()))));
    }
}
