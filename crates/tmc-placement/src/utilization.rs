use crate::types::ClusterRegistration;

const NO_AXIS_SENTINEL: f64 = 0.1;

fn axis_ratio(allocated: Option<f64>, capacity: Option<f64>) -> Option<f64> {
    match (allocated, capacity) {
        (Some(a), Some(c)) if c > 0.0 => Some(a / c),
        _ => None,
    }
}

/// Unweighted mean of whichever resource axes are defined. Falls back to a
/// `0.1` sentinel when no axis is defined at all, and clamps to `[0, 1]`.
pub fn utilization(cluster: &ClusterRegistration) -> f64 {
    let capacity = cluster.capacity.as_ref();
    let allocated = cluster.allocated.as_ref();

    let axes = [
        axis_ratio(
            allocated.and_then(|a| a.cpu),
            capacity.and_then(|c| c.cpu),
        ),
        axis_ratio(
            allocated.and_then(|a| a.memory),
            capacity.and_then(|c| c.memory),
        ),
        axis_ratio(
            allocated.and_then(|a| a.pods),
            capacity.and_then(|c| c.pods),
        ),
    ];

    let defined: Vec<f64> = axes.into_iter().flatten().collect();
    if defined.is_empty() {
        return NO_AXIS_SENTINEL;
    }

    let mean = defined.iter().sum::<f64>() / defined.len() as f64;
    mean.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceAxes;

    #[test]
    fn no_capacity_info_yields_sentinel() {
        let cluster = ClusterRegistration::new("a", "us-west");
        assert_eq!(utilization(&cluster), 0.1);
    }

    #[test]
    fn single_axis_mean_matches_the_ratio() {
        let cluster = ClusterRegistration::new("a", "us-west")
            .with_capacity(ResourceAxes {
                cpu: Some(100.0),
                memory: None,
                pods: None,
            })
            .with_allocated(ResourceAxes {
                cpu: Some(80.0),
                memory: None,
                pods: None,
            });
        assert_eq!(utilization(&cluster), 0.8);
    }

    #[test]
    fn multi_axis_mean_is_unweighted() {
        let cluster = ClusterRegistration::new("a", "us-west")
            .with_capacity(ResourceAxes {
                cpu: Some(100.0),
                memory: Some(100.0),
                pods: None,
            })
            .with_allocated(ResourceAxes {
                cpu: Some(20.0),
                memory: Some(80.0),
                pods: None,
            });
        assert_eq!(utilization(&cluster), 0.5);
    }

    #[test]
    fn result_is_clamped_to_unit_interval() {
        let cluster = ClusterRegistration::new("a", "us-west")
            .with_capacity(ResourceAxes {
                cpu: Some(10.0),
                memory: None,
                pods: None,
            })
            .with_allocated(ResourceAxes {
                cpu: Some(50.0),
                memory: None,
                pods: None,
            });
        assert_eq!(utilization(&cluster), 1.0);
    }
}
