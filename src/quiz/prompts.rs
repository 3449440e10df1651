//! Prompt rendering for the generator, one question/answer pair per variant.
//!
//! Every question prompt pins the reply to a strict JSON shape so the parsing
//! layer can decode it without heuristics.

use crate::clients::MovieDetails;
use crate::quiz::Personality;

/// Flavor block injected into question prompts.
pub fn personality_flavor(personality: Personality) -> &'static str {
    match personality {
        Personality::Default => "You are a friendly movie quiz master.",
        Personality::Christmas => {
            "You are Santa Claus hosting a movie quiz. Sprinkle in festive cheer and ho-ho-hos."
        }
        Personality::Scientist => {
            "You are an enthusiastic but easily distracted scientist hosting a movie quiz. \
             Use (mildly overdone) scientific jargon."
        }
        Personality::Dad => {
            "You are a dad hosting a movie quiz. Work terrible dad jokes and puns into everything."
        }
    }
}

/// Question prompt for the title-detectives riddle.
pub fn title_detectives_question(movie: &MovieDetails, personality: Personality) -> String {
    format!(
        "{flavor}\n\
         Create a riddle-style question that describes the movie \"{title}\" without ever \
         naming it, its characters, or its actors. The player has to guess the title.\n\
         Movie metadata you may allude to:\n\
         - tagline: {tagline}\n\
         - overview: {overview}\n\
         - genres: {genres}\n\
         - budget: {budget}\n\
         - revenue: {revenue}\n\
         - average rating: {vote_average} ({vote_count} votes)\n\
         - release date: {release_date}\n\
         - runtime: {runtime} minutes\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"question\": \"...\", \"hint1\": \"...\", \"hint2\": \"...\"}}\n\
         hint1 is vague, hint2 almost gives it away.",
        flavor = personality_flavor(personality),
        title = movie.title,
        tagline = movie.tagline,
        overview = movie.overview,
        genres = movie.genre_list(),
        budget = movie.budget,
        revenue = movie.revenue,
        vote_average = movie.vote_average,
        vote_count = movie.vote_count,
        release_date = movie.release_date,
        runtime = movie.runtime,
    )
}

/// Answer prompt judging a free-text title guess.
pub fn title_detectives_answer(answer: &str) -> String {
    format!(
        "The player answered: \"{answer}\".\n\
         Judge whether this names the movie from your riddle. Award 3 points for the right \
         title, 2 for a close or partial match, 1 for the right franchise, 0 otherwise.\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"points\": 0, \"answer\": \"...\"}}\n\
         where answer is your in-character verdict naming the correct movie."
    )
}

/// Question prompt inventing a sequel for a franchise.
pub fn sequel_salad_question(franchise: &str, personality: Personality) -> String {
    format!(
        "{flavor}\n\
         Invent a plausible but fictional new sequel for the \"{franchise}\" franchise. \
         Do not name the franchise or any of its characters anywhere in your reply; the \
         player has to guess the franchise from the pitch.\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"sequel_plot\": \"...\", \"sequel_title\": \"...\", \"poster_prompt\": \"...\"}}\n\
         poster_prompt is a text-to-image prompt for the sequel's poster and must not \
         contain the franchise name either.",
        flavor = personality_flavor(personality),
    )
}

/// Answer prompt judging a free-text franchise guess.
pub fn sequel_salad_answer(answer: &str) -> String {
    format!(
        "The player guessed the franchise: \"{answer}\".\n\
         Judge whether this names the franchise your sequel pitch was based on. Award 3 \
         points for the right franchise, 1 for a very close guess, 0 otherwise.\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"points\": 0, \"answer\": \"...\"}}\n\
         where answer is your in-character verdict naming the correct franchise."
    )
}

/// Question prompt for fixed-topic multiple-choice trivia.
pub fn bttf_trivia_question(context: &str, personality: Personality) -> String {
    format!(
        "{flavor}\n\
         Using the background material below, create one challenging multiple-choice \
         trivia question about Back to the Future with exactly four options and one \
         correct option.\n\
         Background material:\n{context}\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"question\": \"...\", \"option_1\": \"...\", \"option_2\": \"...\", \
         \"option_3\": \"...\", \"option_4\": \"...\", \"correct_answer\": 1}}\n\
         correct_answer is the 1-based index of the right option.",
        flavor = personality_flavor(personality),
    )
}

/// Question prompt for per-movie multiple-choice trivia.
pub fn trivia_question(movie: &MovieDetails, facts: &str, personality: Personality) -> String {
    format!(
        "{flavor}\n\
         Using the background material below, create one challenging multiple-choice \
         trivia question about the movie \"{title}\" with exactly four options and one \
         correct option.\n\
         Movie metadata: tagline: {tagline}; genres: {genres}; release date: \
         {release_date}; runtime: {runtime} minutes.\n\
         Background material:\n{facts}\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"question\": \"...\", \"option_1\": \"...\", \"option_2\": \"...\", \
         \"option_3\": \"...\", \"option_4\": \"...\", \"correct_answer\": 1}}\n\
         correct_answer is the 1-based index of the right option.",
        flavor = personality_flavor(personality),
        title = movie.title,
        tagline = movie.tagline,
        genres = movie.genre_list(),
        release_date = movie.release_date,
        runtime = movie.runtime,
    )
}

/// Feedback prompt after a multiple-choice pick; scoring happened in code, so
/// the generator only phrases the reaction.
pub fn choice_feedback(picked: &str, index: u8, correct: bool) -> String {
    let outcome = if correct { "correct" } else { "incorrect" };
    format!(
        "The player picked option {index}: \"{picked}\", which is {outcome}.\n\
         React in character, name the correct option, and add one fun related fact.\n\
         Reply with JSON only, exactly this shape:\n\
         {{\"answer\": \"...\"}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompts_embed_the_subject() {
        let prompt = sequel_salad_question("Jurassic Park", Personality::Default);
        assert!(prompt.contains("Jurassic Park"));
        assert!(prompt.contains("sequel_plot"));

        let prompt = bttf_trivia_question("some facts", Personality::Dad);
        assert!(prompt.contains("some facts"));
        assert!(prompt.contains("correct_answer"));
        assert!(prompt.contains(personality_flavor(Personality::Dad)));
    }

    #[test]
    fn feedback_prompt_states_the_outcome() {
        let prompt = choice_feedback("Marty McFly", 2, false);
        assert!(prompt.contains("option 2"));
        assert!(prompt.contains("incorrect"));
    }
}
