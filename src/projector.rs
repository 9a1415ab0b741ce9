use crate::geometry::{Bounds, Pose};
use crate::interpreter::ScriptCursor;
use crate::script::Block;

/// Pose an actor would end in after running `scripts` to completion.
///
/// Walks the same cursor as the animated run but folds every effect in
/// immediately, so no time passes and nothing is written anywhere.
pub fn project(scripts: &[Block], start: Pose, bounds: Bounds) -> Pose {
    let mut cursor = ScriptCursor::new(scripts);
    let mut pose = start;
    while let Some(effect) = cursor.next_effect(pose, bounds) {
        pose = effect.end_pose(pose);
    }
    pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{BlockKind, Param, Params};
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::rstest;

    fn bounds() -> Bounds {
        Bounds::for_stage(1000.0, 550.0, 100.0)
    }

    #[test]
    fn empty_script_stays_put() {
        let start = Pose::new(40.0, 60.0, 30.0);
        assert_eq!(project(&[], start, bounds()), start);
    }

    #[test]
    fn square_walk_returns_home() {
        let script = vec![
            Block::repeat(4, vec![]),
            Block::move_steps(100.0),
            Block::turn(90.0),
        ];
        let end = project(&script, Pose::new(200.0, 200.0, 0.0), bounds());
        assert_relative_eq!(end.position.x, 200.0, epsilon = 1e-3);
        assert_relative_eq!(end.position.y, 200.0, epsilon = 1e-3);
        assert_relative_eq!(end.rotation, 360.0);
    }

    #[test]
    fn moves_clamp_at_the_edge() {
        let script = vec![Block::move_steps(5000.0)];
        let end = project(&script, Pose::new(10.0, 10.0, 0.0), bounds());
        assert_eq!(end.position, Vec2::new(900.0, 10.0));
    }

    #[test]
    fn speech_does_not_move() {
        let script = vec![Block::say("hi", 1.0), Block::think("hm", 1.0)];
        let start = Pose::new(5.0, 5.0, 12.0);
        assert_eq!(project(&script, start, bounds()), start);
    }

    #[test]
    fn goto_then_turn() {
        let script = vec![Block::goto(300.0, 120.0), Block::turn(-45.0)];
        let end = project(&script, Pose::default(), bounds());
        assert_eq!(end, Pose::new(300.0, 120.0, -45.0));
    }

    fn huge(kind: BlockKind, key: &str, value: Param) -> Block {
        Block::new(kind, Params::new().with(key, value))
    }

    #[rstest]
    #[case::steps_text(vec![huge(BlockKind::Move, "steps", "1e39".into())])]
    #[case::steps_number(vec![huge(BlockKind::Move, "steps", 1e39_f64.into())])]
    #[case::diagonal(vec![Block::turn(45.0), huge(BlockKind::Move, "steps", "-1e39".into())])]
    #[case::turn_then_move(vec![huge(BlockKind::Turn, "degrees", "1e39".into()), Block::move_steps(10.0)])]
    #[case::turns_pile_up(vec![
        huge(BlockKind::Turn, "degrees", 1e39_f64.into()),
        huge(BlockKind::Turn, "degrees", 1e39_f64.into()),
        Block::move_steps(10.0),
    ])]
    #[case::goto(vec![huge(BlockKind::Goto, "x", "1e39".into())])]
    fn huge_parameters_stay_on_stage(#[case] script: Vec<Block>) {
        let end = project(&script, Pose::new(300.0, 200.0, 0.0), bounds());
        assert!(bounds().contains(end.position), "ended at {:?}", end.position);
        assert!(end.rotation.is_finite());
    }
}
