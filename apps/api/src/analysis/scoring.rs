/// Score given to any analysed resume before bonuses.
const BASE_SCORE: f64 = 50.0;
const SKILL_POINTS: f64 = 2.0;
const SKILL_CAP: f64 = 30.0;
const EXPERIENCE_POINTS: f64 = 2.0;
const EXPERIENCE_CAP: f64 = 20.0;

/// Resume score in 0..=100:
/// `50 + min(skills * 2, 30) + min(years * 2, 20)`, clamped to 100.
pub fn compute_score(skill_count: usize, experience_years: f64) -> u8 {
    let skill_bonus = (skill_count as f64 * SKILL_POINTS).min(SKILL_CAP);
    let years = if experience_years.is_finite() {
        experience_years.max(0.0)
    } else {
        0.0
    };
    let experience_bonus = (years * EXPERIENCE_POINTS).min(EXPERIENCE_CAP);
    (BASE_SCORE + skill_bonus + experience_bonus)
        .clamp(0.0, 100.0)
        .round() as u8
}
