use criterion::{black_box, criterion_group, criterion_main, Criterion};

use assessor_core::ledger::AnswerLedger;
use assessor_core::model::{AnswerOption, Question, QuestionId};
use assessor_core::scorer::{grade, percentage, score};

fn make_questions(n: u64) -> Vec<Question> {
    (1..=n)
        .map(|id| Question {
            id: QuestionId::new(id),
            prompt: format!("Question {id}"),
            options: (0..4)
                .map(|i| AnswerOption::new(format!("option {i}"), i == id as usize % 4))
                .collect(),
            points: 1,
        })
        .collect()
}

/// Answer every other question, alternating right and wrong.
fn make_ledger(questions: &[Question]) -> AnswerLedger {
    let mut ledger = AnswerLedger::for_questions(questions);
    for (i, q) in questions.iter().enumerate().step_by(2) {
        let correct = q.correct_index().unwrap_or(0);
        let option = if i % 4 == 0 { correct } else { (correct + 1) % 4 };
        ledger.record(q.id, option).unwrap();
    }
    ledger
}

fn bench_percentage(c: &mut Criterion) {
    c.bench_function("percentage", |b| {
        b.iter(|| percentage(black_box(37), black_box(53)))
    });
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [10u64, 100, 1000] {
        let questions = make_questions(n);
        let ledger = make_ledger(&questions);
        group.bench_function(format!("questions={n}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&ledger), black_box(70)))
        });
    }

    group.finish();
}

fn bench_grade(c: &mut Criterion) {
    let questions = make_questions(100);
    let ledger = make_ledger(&questions);
    c.bench_function("grade/questions=100", |b| {
        b.iter(|| grade(black_box(&questions), black_box(&ledger)))
    });
}

criterion_group!(benches, bench_percentage, bench_score, bench_grade);
criterion_main!(benches);
