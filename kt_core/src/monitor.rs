use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kt_http::ExchangeGateway;
use kt_http::KrakenEndpoints;
use kt_types::FixedPoint;
use kt_types::OrderStatus;
use kt_types::Requester;
use kt_types::trim_description;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::errors::Anomaly;
use crate::errors::DeskError;
use crate::handle::MonitorCommand;
use crate::handle::MonitorHandle;
use crate::notification::Notification;

/// One placed order awaiting a terminal status
#[derive(Debug)]
struct Watch {
    recipient: Requester,
    registered_at: Instant,
    interval: Duration,
    next_poll: Instant,
}

#[derive(Debug)]
enum PollOutcome {
    Pending(OrderStatus),
    Closed { description: String, executed: Option<FixedPoint> },
    Canceled,
    Failed(String),
}

/// Polls watched orders one at a time, each on its own schedule, and reports
/// executions and errors through the notification channel
pub struct OrderMonitor<G> {
    gateway: Arc<G>,
    interval: Duration,
    watches: HashMap<String, Watch>,
    notify_tx: UnboundedSender<Notification>,
}

impl<G: ExchangeGateway + 'static> OrderMonitor<G> {
    pub fn new(gateway: Arc<G>, interval: Duration, notify_tx: UnboundedSender<Notification>) -> Self {
        Self { gateway, interval, watches: HashMap::new(), notify_tx }
    }

    /// Start the monitor on the tokio runtime. The task ends once every
    /// [`MonitorHandle`] is dropped.
    pub fn spawn(gateway: Arc<G>, interval: Duration, notify_tx: UnboundedSender<Notification>) -> (MonitorHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let monitor = Self::new(gateway, interval, notify_tx);
        (MonitorHandle::new(command_tx), tokio::spawn(monitor.run(command_rx)))
    }

    pub async fn run(mut self, mut command_rx: UnboundedReceiver<MonitorCommand>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Order monitor started");

        loop {
            let next_due = self.watches.values().map(|watch| watch.next_poll).min();
            let deadline = next_due.unwrap_or_else(Instant::now);

            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => self.apply(command),
                    None => {
                        tracing::info!(pending = self.watches.len(), "Order monitor shutting down");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline), if next_due.is_some() => self.poll_due().await,
            }
        }
    }

    fn apply(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::Watch { txid, recipient } => {
                if self.watches.contains_key(&txid) {
                    tracing::debug!(%txid, "Order already watched");
                    return;
                }
                let now = Instant::now();
                tracing::info!(%txid, %recipient, "Watching order");
                self.watches.insert(txid, Watch { recipient, registered_at: now, interval: self.interval, next_poll: now });
            }
            MonitorCommand::ActiveWatches { respond_to } => {
                let mut txids: Vec<String> = self.watches.keys().cloned().collect();
                txids.sort();
                let _ = respond_to.send(txids);
            }
        }
    }

    /// Poll every watch whose time has come, earliest first
    async fn poll_due(&mut self) {
        let now = Instant::now();
        let mut due: Vec<(Instant, String)> = self
            .watches
            .iter()
            .filter(|(_, watch)| watch.next_poll <= now)
            .map(|(txid, watch)| (watch.next_poll, txid.clone()))
            .collect();
        due.sort();

        for (_, txid) in due {
            let outcome = self.poll(&txid).await;
            self.settle(txid, outcome);
        }
    }

    async fn poll(&self, txid: &str) -> PollOutcome {
        let mut orders = match self.gateway.query_orders(txid).await {
            Ok(orders) => orders,
            Err(err) => return PollOutcome::Failed(err.to_string()),
        };

        match orders.remove(txid) {
            Some(order) => match order.status {
                OrderStatus::Closed => PollOutcome::Closed { description: trim_description(&order.descr.order), executed: order.vol_exec },
                OrderStatus::Canceled => PollOutcome::Canceled,
                status => PollOutcome::Pending(status),
            },
            None => PollOutcome::Failed(Anomaly::NotFound { txid: txid.to_string() }.to_string()),
        }
    }

    fn settle(&mut self, txid: String, outcome: PollOutcome) {
        if let PollOutcome::Pending(status) = outcome {
            if let Some(watch) = self.watches.get_mut(&txid) {
                watch.next_poll = Instant::now() + watch.interval;
                tracing::trace!(%txid, ?status, "Order still pending");
            }
            return;
        }

        let Some(watch) = self.watches.remove(&txid) else {
            return;
        };
        let watched_for = watch.registered_at.elapsed();

        match outcome {
            PollOutcome::Closed { description, executed } => {
                tracing::info!(%txid, ?watched_for, executed = ?executed.map(FixedPoint::trimmed), "Order executed");
                self.notify(watch.recipient, format!("Trade executed: {txid}\n{description}"));
            }
            PollOutcome::Canceled => {
                tracing::info!(%txid, ?watched_for, "Order canceled, no longer watched");
            }
            PollOutcome::Failed(error) => {
                tracing::warn!(%txid, %error, "Order query failed, no longer watched");
                self.notify(watch.recipient, error);
            }
            PollOutcome::Pending(_) => {}
        }
    }

    fn notify(&self, recipient: Requester, text: String) {
        if self.notify_tx.send(Notification { recipient, text }).is_err() {
            tracing::error!(%recipient, "Notification channel closed, message dropped");
        }
    }
}

/// Attach a watch to every order that is open on the exchange, reporting to
/// `owner`. A failed listing is sent to `owner` as well and returned.
pub async fn reconcile_open_orders<G: ExchangeGateway>(
    gateway: &G,
    monitor: &MonitorHandle,
    owner: Requester,
    notify_tx: &UnboundedSender<Notification>,
) -> Result<usize, DeskError> {
    let open = match gateway.open_orders().await {
        Ok(open) => open,
        Err(err) => {
            tracing::error!(error = %err, "Could not list open orders");
            let _ = notify_tx.send(Notification::new(owner, err.to_string()));
            return Err(err.into());
        }
    };

    for txid in open.open.keys() {
        monitor.watch(txid.clone(), owner)?;
    }

    tracing::info!(count = open.open.len(), "Watching orders that were open at startup");
    Ok(open.open.len())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use kt_http::GatewayError;
    use serde_json::json;

    use super::*;
    use crate::mock::MockGateway;

    const INTERVAL: Duration = Duration::from_secs(30);

    fn order(status: &str) -> serde_json::Value {
        json!({"status": status, "descr": {"order": "buy 0.25000000 XBTEUR @ limit 5000.0"}})
    }

    /// `QueryOrders` payload holding the requested txid with `status`
    fn queried(params: &[(&str, String)], status: &str) -> serde_json::Value {
        let mut orders = serde_json::Map::new();
        orders.insert(params[0].1.clone(), order(status));
        serde_json::Value::Object(orders)
    }

    fn start(gateway: MockGateway) -> (Arc<MockGateway>, MonitorHandle, UnboundedReceiver<Notification>) {
        let gateway = Arc::new(gateway);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (handle, _task) = OrderMonitor::spawn(gateway.clone(), INTERVAL, notify_tx);
        (gateway, handle, notify_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_order_notifies_once() {
        let polls = AtomicUsize::new(0);
        let (gateway, handle, mut notify_rx) = start(MockGateway::new(move |_, params| {
            let status = if polls.fetch_add(1, Ordering::SeqCst) < 2 { "open" } else { "closed" };
            Ok(queried(params, status))
        }));

        handle.watch("OABC", Requester(7)).unwrap();
        tokio::time::sleep(Duration::from_secs(75)).await;

        let notification = notify_rx.try_recv().unwrap();
        assert_eq!(notification, Notification::new(Requester(7), "Trade executed: OABC\nbuy 0.25 XBTEUR @ limit 5000"));
        assert_eq!(gateway.count("QueryOrders"), 3);

        tokio::time::sleep(INTERVAL * 10).await;
        assert!(notify_rx.try_recv().is_err());
        assert_eq!(gateway.count("QueryOrders"), 3);
        assert!(handle.active_watches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_poll_carries_executed_volume() {
        let gateway = Arc::new(MockGateway::new(|_, _| {
            Ok(json!({"OABC": {"status": "closed", "descr": {"order": "sell 0.50000000 XBTEUR @ limit 30000.0"}, "vol_exec": "0.50000000"}}))
        }));
        let (notify_tx, _notify_rx) = mpsc::unbounded_channel();
        let monitor = OrderMonitor::new(gateway, INTERVAL, notify_tx);

        match monitor.poll("OABC").await {
            PollOutcome::Closed { description, executed } => {
                assert_eq!(description, "sell 0.5 XBTEUR @ limit 30000");
                assert_eq!(executed, Some("0.5".parse().unwrap()));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_follow_interval() {
        let (gateway, handle, _notify_rx) = start(MockGateway::new(|_, params| Ok(queried(params, "open"))));

        handle.watch("OABC", Requester(7)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(gateway.count("QueryOrders"), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(gateway.count("QueryOrders"), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(gateway.count("QueryOrders"), 4);
        assert_eq!(handle.active_watches().await.unwrap(), vec!["OABC".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_canceled_order_is_dropped_silently() {
        let (gateway, handle, mut notify_rx) = start(MockGateway::new(|_, params| Ok(queried(params, "canceled"))));

        handle.watch("OABC", Requester(7)).unwrap();
        tokio::time::sleep(INTERVAL * 5).await;

        assert!(notify_rx.try_recv().is_err());
        assert_eq!(gateway.count("QueryOrders"), 1);
        assert!(handle.active_watches().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_notifies_and_stops() {
        let (gateway, handle, mut notify_rx) = start(MockGateway::new(|_, _| Err(GatewayError::exchange("EOrder:Invalid order"))));

        handle.watch("OABC", Requester(7)).unwrap();
        tokio::time::sleep(INTERVAL * 5).await;

        assert_eq!(notify_rx.try_recv().unwrap(), Notification::new(Requester(7), "EOrder:Invalid order"));
        assert!(notify_rx.try_recv().is_err());
        assert_eq!(gateway.count("QueryOrders"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_record_notifies_not_found() {
        let (_gateway, handle, mut notify_rx) = start(MockGateway::new(|_, _| Ok(json!({}))));

        handle.watch("OABC", Requester(7)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(notify_rx.try_recv().unwrap().text, "No order with TXID OABC");
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_watch_is_ignored() {
        let (gateway, handle, _notify_rx) = start(MockGateway::new(|_, params| Ok(queried(params, "open"))));

        handle.watch("OABC", Requester(7)).unwrap();
        handle.watch("OABC", Requester(8)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(handle.active_watches().await.unwrap(), vec!["OABC".to_string()]);
        assert_eq!(gateway.count("QueryOrders"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_watches_every_open_order() {
        let (gateway, handle, mut notify_rx) = start(MockGateway::new(|method, params| match method {
            "OpenOrders" => Ok(json!({"open": {"OA": order("open"), "OB": order("open"), "OC": order("open")}})),
            "QueryOrders" => Ok(queried(params, "open")),
            other => panic!("unexpected call {other}"),
        }));
        let (owner_tx, _owner_rx) = mpsc::unbounded_channel();

        let count = reconcile_open_orders(gateway.as_ref(), &handle, Requester(1), &owner_tx).await.unwrap();
        assert_eq!(count, 3);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(gateway.count("QueryOrders"), 3);
        assert_eq!(handle.active_watches().await.unwrap(), vec!["OA".to_string(), "OB".to_string(), "OC".to_string()]);
        assert!(notify_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_failure_notifies_owner() {
        let (gateway, handle, _notify_rx) = start(MockGateway::new(|_, _| Err(GatewayError::Unreachable("connection refused".into()))));
        let (owner_tx, mut owner_rx) = mpsc::unbounded_channel();

        let result = reconcile_open_orders(gateway.as_ref(), &handle, Requester(1), &owner_tx).await;
        assert!(matches!(result, Err(DeskError::Gateway(GatewayError::Unreachable(_)))));

        let notification = owner_rx.try_recv().unwrap();
        assert_eq!(notification.recipient, Requester(1));
        assert_eq!(notification.text, "Kraken unreachable: connection refused");
        assert!(handle.active_watches().await.unwrap().is_empty());
    }
}
