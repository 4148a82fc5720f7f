use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use concierge_core::{AgentError, AgentGraph, RunContext};

/// Pacing between streamed chunks, small enough for tests
const STREAM_PACING: Duration = Duration::from_millis(15);

/// A booked flight, the structured state this agent publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightBooking {
    pub airline: String,
    pub flight_number: String,
    pub departure: NaiveDate,
    pub price_usd: u32,
    pub request: String,
}

impl FlightBooking {
    /// Deterministic pick from a fixed inventory, keyed off the request text
    pub fn plan(request: &str) -> Self {
        const INVENTORY: [(&str, &str, u32); 3] = [
            ("Atlas Air", "AT 204", 420),
            ("Meridian", "MD 88", 510),
            ("Pacific Wings", "PW 17", 389),
        ];
        let (airline, flight_number, price_usd) = INVENTORY[request.len() % INVENTORY.len()];
        Self {
            airline: airline.to_string(),
            flight_number: flight_number.to_string(),
            departure: Utc::now().date_naive() + Days::new(14),
            price_usd,
            request: request.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} flight {} departing {} for ${}",
            self.airline, self.flight_number, self.departure, self.price_usd
        )
    }
}

/// The flight booking specialist
#[derive(Debug, Default)]
pub struct FlightAgent;

impl FlightAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentGraph for FlightAgent {
    fn name(&self) -> &str {
        "flight-agent"
    }

    fn description(&self) -> &str {
        "Book a flight"
    }

    async fn run(&self, ctx: &RunContext) -> Result<String, AgentError> {
        let request = ctx
            .latest_user_message()
            .unwrap_or("a flight")
            .to_string();

        ctx.text(format!("Searching flights for \"{request}\"...\n"))?;
        tokio::time::sleep(STREAM_PACING).await;

        let booking = FlightBooking::plan(&request);
        ctx.text(format!("Best option: {}.\n", booking.summary()))?;
        tokio::time::sleep(STREAM_PACING).await;

        let summary = booking.summary();
        ctx.snapshot(json!({ "flight": booking, "status": "booked" }))?;

        Ok(format!("Booked {summary}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{spawn_run, AgentEvent, Message};
    use std::sync::Arc;

    #[test]
    fn plan_is_deterministic_for_the_same_request() {
        let a = FlightBooking::plan("to Lisbon");
        let b = FlightBooking::plan("to Lisbon");
        assert_eq!(a.airline, b.airline);
        assert_eq!(a.flight_number, b.flight_number);
        assert_eq!(a.price_usd, b.price_usd);
    }

    #[tokio::test]
    async fn run_publishes_booking_state_and_final_message() {
        let mut handle = spawn_run(
            Arc::new(FlightAgent::new()),
            "t1".into(),
            vec![Message::user("to Lisbon")],
            json!({}),
        );
        let mut rx = handle.take_events().unwrap();

        let mut snapshot = None;
        let mut finished = None;
        while let Ok(event) = rx.recv().await {
            let terminal = event.is_terminal();
            match event {
                AgentEvent::StateSnapshot { state, .. } => snapshot = Some(state),
                AgentEvent::RunFinished { message, .. } => finished = Some(message),
                _ => {}
            }
            if terminal {
                break;
            }
        }

        let state = snapshot.expect("no state snapshot emitted");
        assert_eq!(state["status"], "booked");
        assert_eq!(state["flight"]["request"], "to Lisbon");
        assert!(finished.expect("no final message").starts_with("Booked"));
    }
}
