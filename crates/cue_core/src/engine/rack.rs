//! Racked starting tables, and the reduced one- and two-ball tables used when
//! trying out deciders.

use nalgebra::Vector2;

use super::ball::{BallNumber, BallRegime};
use super::config::TableConfig;
use super::physics_constants::table;
use super::table::{BallPlacement, Table};

/// Eight-ball rack, apex first, row by row toward the foot rail. The eight
/// sits in the middle of the third row.
const EIGHT_BALL_ORDER: [u8; 15] = [1, 9, 2, 10, 8, 3, 11, 4, 12, 5, 13, 6, 14, 7, 15];

/// Cue ball on the head spot and fifteen balls racked on the foot spot.
pub fn eight_ball_rack(config: TableConfig) -> Table {
    Table::from_positions(config, &eight_ball_placements(&config))
}

/// Only the cue ball in play; object balls are off the table at the origin.
pub fn one_ball_table(config: TableConfig) -> Table {
    let placements: Vec<BallPlacement> = eight_ball_placements(&config)
        .into_iter()
        .map(|p| {
            if p.ball.is_cue() {
                p
            } else {
                BallPlacement::new(p.ball, Vector2::zeros(), BallRegime::NotInPlay)
            }
        })
        .collect();
    Table::from_positions(config, &placements)
}

/// Cue ball and the one ball in play. The rest keep their rack positions but
/// are out of play.
pub fn two_ball_table(config: TableConfig) -> Table {
    let placements: Vec<BallPlacement> = eight_ball_placements(&config)
        .into_iter()
        .map(|mut p| {
            if p.ball.get() >= 2 {
                p.regime = BallRegime::NotInPlay;
            }
            p
        })
        .collect();
    Table::from_positions(config, &placements)
}

fn eight_ball_placements(config: &TableConfig) -> Vec<BallPlacement> {
    let centre_x = config.width / 2.0;
    let foot = Vector2::new(centre_x, config.length * table::FOOT_SPOT_FRACTION);
    let pitch = 2.0 * config.ball_radius + table::RACK_GAP_M;
    let row_depth = pitch * 3f64.sqrt() / 2.0;

    let mut placements = vec![BallPlacement::new(
        BallNumber::CUE,
        Vector2::new(centre_x, config.length * table::HEAD_SPOT_FRACTION),
        BallRegime::Stationary,
    )];

    let mut order = EIGHT_BALL_ORDER.iter().filter_map(|&n| BallNumber::new(n));
    for row in 0..5usize {
        for slot in 0..=row {
            let Some(number) = order.next() else {
                break;
            };
            let offset = Vector2::new((slot as f64 - row as f64 / 2.0) * pitch, row as f64 * row_depth);
            placements.push(BallPlacement::new(number, foot + offset, BallRegime::Stationary));
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(number: u8) -> BallNumber {
        BallNumber::new(number).unwrap()
    }

    #[test]
    fn test_rack_has_every_ball_without_overlap() {
        let rack = eight_ball_rack(TableConfig::default());
        assert_eq!(rack.ball_count(), 16);

        let balls: Vec<_> = rack.balls().collect();
        for (i, a) in balls.iter().enumerate() {
            for b in &balls[i + 1..] {
                let gap = (a.state.position - b.state.position).norm();
                assert!(gap >= 2.0 * a.radius, "{} and {} overlap", a.number, b.number);
            }
        }
    }

    #[test]
    fn test_rack_spots() {
        let config = TableConfig::default();
        let rack = eight_ball_rack(config);
        let apex = rack.ball(n(1)).unwrap().state.position;
        assert_eq!(apex, Vector2::new(config.width / 2.0, config.length * 0.75));
        let eight = rack.ball(BallNumber::EIGHT).unwrap().state.position;
        assert!((eight.x - config.width / 2.0).abs() < 1e-12);
        assert!(eight.y > apex.y);
        assert_eq!(rack.ball(BallNumber::CUE).unwrap().state.position.y, config.length * 0.25);
    }

    #[test]
    fn test_one_ball_table() {
        let t = one_ball_table(TableConfig::default());
        let visible: Vec<u8> = t.balls().filter(|b| b.state.regime.is_visible()).map(|b| b.number.get()).collect();
        assert_eq!(visible, vec![0]);
        assert_eq!(t.ball(n(15)).unwrap().state.position, Vector2::zeros());
    }

    #[test]
    fn test_two_ball_table_keeps_rack_positions() {
        let config = TableConfig::default();
        let t = two_ball_table(config);
        let visible: Vec<u8> = t.balls().filter(|b| b.state.regime.is_visible()).map(|b| b.number.get()).collect();
        assert_eq!(visible, vec![0, 1]);
        let racked = eight_ball_rack(config);
        assert_eq!(t.ball(n(7)).unwrap().state.position, racked.ball(n(7)).unwrap().state.position);
        assert_eq!(t.ball(n(7)).unwrap().state.regime, BallRegime::NotInPlay);
    }
}
