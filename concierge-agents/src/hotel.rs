use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use concierge_core::{AgentError, AgentGraph, RunContext};

const STREAM_PACING: Duration = Duration::from_millis(15);

/// A booked hotel stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelBooking {
    pub hotel: String,
    pub check_in: NaiveDate,
    pub nights: u32,
    pub rate_usd: u32,
    pub request: String,
}

impl HotelBooking {
    /// Deterministic pick from a fixed inventory, keyed off the request text
    pub fn plan(request: &str) -> Self {
        const INVENTORY: [(&str, u32); 3] = [
            ("Hotel Meridiana", 140),
            ("The Harbor House", 210),
            ("Casa Verde", 95),
        ];
        let (hotel, rate_usd) = INVENTORY[request.len() % INVENTORY.len()];
        Self {
            hotel: hotel.to_string(),
            check_in: Utc::now().date_naive() + Days::new(14),
            nights: 3,
            rate_usd,
            request: request.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} from {} for {} nights at ${}/night",
            self.hotel, self.check_in, self.nights, self.rate_usd
        )
    }
}

/// The hotel booking specialist
#[derive(Debug, Default)]
pub struct HotelAgent;

impl HotelAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentGraph for HotelAgent {
    fn name(&self) -> &str {
        "hotel-agent"
    }

    fn description(&self) -> &str {
        "Book a hotel"
    }

    async fn run(&self, ctx: &RunContext) -> Result<String, AgentError> {
        let request = ctx.latest_user_message().unwrap_or("a hotel").to_string();

        ctx.text(format!("Searching hotels for \"{request}\"...\n"))?;
        tokio::time::sleep(STREAM_PACING).await;

        let booking = HotelBooking::plan(&request);
        ctx.text(format!("Best option: {}.\n", booking.summary()))?;
        tokio::time::sleep(STREAM_PACING).await;

        let summary = booking.summary();
        ctx.snapshot(json!({ "hotel": booking, "status": "booked" }))?;

        Ok(format!("Booked {summary}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{spawn_run, AgentEvent, Message};
    use std::sync::Arc;

    #[tokio::test]
    async fn run_publishes_booking_state() {
        let mut handle = spawn_run(
            Arc::new(HotelAgent::new()),
            "t1".into(),
            vec![Message::user("two nights in Porto")],
            json!({}),
        );
        let mut rx = handle.take_events().unwrap();

        let mut snapshot = None;
        while let Ok(event) = rx.recv().await {
            let terminal = event.is_terminal();
            if let AgentEvent::StateSnapshot { state, .. } = event {
                snapshot = Some(state);
            }
            if terminal {
                break;
            }
        }

        let state = snapshot.expect("no state snapshot emitted");
        assert_eq!(state["status"], "booked");
        assert!(state["hotel"]["hotel"].is_string());
    }
}
