//! In-memory resource used by the view tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::client::{ListQuery, Resource};
use crate::error::ClientError;
use crate::models::{FieldValue, Record};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Item {
    pub id: String,
    pub name: String,
    pub active: bool,
}

impl Item {
    pub(crate) fn new(id: &str, name: &str, active: bool) -> Self {
        Self { id: id.to_string(), name: name.to_string(), active }
    }

    fn apply(&mut self, payload: &Value) {
        if let Some(name) = payload.get("name").and_then(Value::as_str) {
            self.name = name.to_string();
        }
        if let Some(active) = payload.get("active").and_then(Value::as_bool) {
            self.active = active;
        }
    }
}

impl Record for Item {
    const RESOURCE: &'static str = "items";
    const LABEL: &'static str = "Item";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "active" => Some(FieldValue::Bool(self.active)),
            _ => None,
        }
    }
}

enum ListPlan {
    Fail(ClientError),
    Hold(Vec<Item>, oneshot::Receiver<()>),
}

pub(crate) struct FakeResource {
    rows: Mutex<Vec<Item>>,
    plans: Mutex<VecDeque<ListPlan>>,
    mutation_error: Mutex<Option<ClientError>>,
    calls: AtomicUsize,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeResource {
    pub(crate) fn new(rows: Vec<Item>) -> Self {
        Self {
            rows: Mutex::new(rows),
            plans: Mutex::new(VecDeque::new()),
            mutation_error: Mutex::new(None),
            calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(100),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_list(&self, err: ClientError) {
        self.plans.lock().unwrap().push_back(ListPlan::Fail(err));
    }

    /// The next list call blocks until the returned sender fires, then yields `rows`
    pub(crate) fn hold_next_list(&self, rows: Vec<Item>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.plans.lock().unwrap().push_back(ListPlan::Hold(rows, rx));
        tx
    }

    pub(crate) fn fail_mutations(&self, err: ClientError) {
        *self.mutation_error.lock().unwrap() = Some(err);
    }

    pub(crate) async fn wait_for_calls(&self, n: usize) {
        for _ in 0..400 {
            if self.calls() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {} calls, saw {}", n, self.calls());
    }

    fn mutation(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mutation_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Resource<Item> for FakeResource {
    async fn list(&self, _query: &ListQuery) -> Result<Vec<Item>, ClientError> {
        let plan = self.plans.lock().unwrap().pop_front();
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        match plan {
            Some(ListPlan::Fail(err)) => Err(err),
            Some(ListPlan::Hold(rows, gate)) => {
                let _ = gate.await;
                Ok(rows)
            }
            None => Ok(self.rows.lock().unwrap().clone()),
        }
    }

    async fn get(&self, id: &str) -> Result<Item, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| ClientError::request_failed(404, "not found"))
    }

    async fn create(&self, payload: &Value) -> Result<Item, ClientError> {
        self.mutation()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let mut item = Item::new(&id, "", false);
        item.apply(payload);
        self.rows.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: &str, payload: &Value) -> Result<Item, ClientError> {
        self.mutation()?;
        let mut rows = self.rows.lock().unwrap();
        let item = rows
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ClientError::request_failed(404, "not found"))?;
        item.apply(payload);
        Ok(item.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        self.mutation()?;
        self.rows.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }
}
