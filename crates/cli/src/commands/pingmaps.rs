//! Ping Maps command handlers

use clap::{Args, Subcommand};
use pingintel_domain::{BoundingBox, PolicyQuery, PINGMAPS};
use pingintel_infra::PingMapsClient;

use super::{parse_key_value, Context};

#[derive(Debug, Subcommand)]
pub enum PingMapsCommands {
    /// Geocoded locations of a policy
    PolicyLocations(PolicyArgs),
    /// Aggregated breakdown of a policy's locations
    PolicyBreakdown {
        #[command(flatten)]
        policy: PolicyArgs,
        /// Field to break down by (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// SOV id of the policy
    pub sovid: String,
    /// Bounding box as LAT1 LNG1 LAT2 LNG2
    #[arg(
        long,
        num_args = 4,
        value_names = ["LAT1", "LNG1", "LAT2", "LNG2"],
        allow_negative_numbers = true
    )]
    pub bbox: Option<Vec<f64>>,
    /// Maximum number of locations
    #[arg(long)]
    pub limit: Option<u32>,
    /// Return points before the full aggregation finishes
    #[arg(long)]
    pub show_points_sooner: bool,
    /// Location filter as key=value (repeatable)
    #[arg(short = 'f', long = "filter", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,
}

impl PolicyArgs {
    fn query(self) -> PolicyQuery {
        let mut query = PolicyQuery::new(self.sovid);
        query.bounds = match self.bbox.as_deref() {
            Some(&[lat1, lng1, lat2, lng2]) => Some(BoundingBox { lat1, lng1, lat2, lng2 }),
            _ => None,
        };
        query.limit = self.limit;
        query.show_points_sooner = self.show_points_sooner.then_some(true);
        self.filters.into_iter().fold(query, |query, (key, value)| query.filter(key, value))
    }
}

pub fn handle_pingmaps_command(cmd: PingMapsCommands, ctx: &Context) -> anyhow::Result<()> {
    let client = PingMapsClient::new(ctx.client(PINGMAPS)?);

    let response = match cmd {
        PingMapsCommands::PolicyLocations(policy) => client.policy_locations(&policy.query())?,
        PingMapsCommands::PolicyBreakdown { policy, fields } => {
            let mut query = policy.query();
            query.fields = fields;
            client.policy_breakdown(&query)?
        }
    };
    // Maps responses are free-form; table mode prints them as compact JSON
    ctx.emit(&response, |response| println!("{response}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_and_filters_become_query() {
        let args = PolicyArgs {
            sovid: "s-1".into(),
            bbox: Some(vec![30.1, -97.9, 30.5, -97.5]),
            limit: Some(50),
            show_points_sooner: false,
            filters: vec![("state".into(), "TX".into())],
        };
        let query = args.query();
        assert_eq!(
            query.bounds,
            Some(BoundingBox { lat1: 30.1, lng1: -97.9, lat2: 30.5, lng2: -97.5 })
        );
        assert_eq!(query.limit, Some(50));
        assert_eq!(query.show_points_sooner, None);
        assert_eq!(query.filters, vec![("state".to_string(), "TX".to_string())]);
    }
}
