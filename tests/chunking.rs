use policy_ingest::chunking::{
    ChunkParams, ChunkingStrategy, chunk_fixed_size, chunk_hybrid, chunk_semantic, chunk_text,
    split_sentences,
};

fn numbered_words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn fixed_size_covers_every_word_with_exact_overlap() {
    let text = numbered_words(1000);
    let words: Vec<&str> = text.split_whitespace().collect();
    let chunks = chunk_fixed_size(&text, 100, 20);

    assert_eq!(chunks.len(), 13);
    assert_eq!(chunks[0].start_word, Some(0));
    assert_eq!(chunks.last().unwrap().end_word, Some(1000));

    let mut seen = vec![false; words.len()];
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_id, i);
        assert_eq!(chunk.chunk_type, ChunkingStrategy::FixedSize);
        let (start, end) = (chunk.start_word.unwrap(), chunk.end_word.unwrap());
        assert_eq!(chunk.text, words[start..end].join(" "));
        assert_eq!(chunk.word_count, end - start);
        for s in &mut seen[start..end] {
            *s = true;
        }
    }
    assert!(seen.iter().all(|s| *s));

    for pair in chunks.windows(2) {
        let a: Vec<&str> = pair[0].text.split_whitespace().collect();
        let b: Vec<&str> = pair[1].text.split_whitespace().collect();
        assert_eq!(&a[a.len() - 20..], &b[..20]);
        assert_eq!(pair[1].start_word.unwrap() - pair[0].start_word.unwrap(), 80);
    }
}

#[test]
fn fixed_size_last_window_is_truncated() {
    let text = numbered_words(25);
    let chunks = chunk_fixed_size(&text, 10, 0);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2].word_count, 5);
    assert_eq!(chunks[2].text, "w20 w21 w22 w23 w24");
}

#[test]
fn fixed_size_without_overlap_rebuilds_the_text() {
    let text = numbered_words(95);
    let chunks = chunk_fixed_size(&text, 10, 0);
    assert_eq!(chunks.len(), 10);
    let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
    assert_eq!(joined, text);
}

#[test]
fn fixed_size_short_text_is_one_chunk() {
    let text = "  a short\n policy text  ";
    let chunks = chunk_fixed_size(text, 100, 10);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "a short\n policy text");
    assert_eq!(chunks[0].word_count, 4);
}

#[test]
fn empty_text_gives_no_chunks() {
    for text in ["", "   ", "\n\n\t"] {
        assert!(chunk_fixed_size(text, 100, 10).is_empty());
        assert!(chunk_semantic(text, 100).is_empty());
        assert!(chunk_hybrid(text, 100, 10).is_empty());
    }
}

fn long_sentence(words: usize) -> String {
    let mut s = String::from("The");
    for _ in 1..words {
        s.push_str(" word");
    }
    s.push('.');
    s
}

#[test]
fn semantic_keeps_oversized_sentence_whole() {
    let text = format!("Short one. {} Another short.", long_sentence(30));
    let chunks = chunk_semantic(&text, 10);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].text, "Short one.");
    assert_eq!(chunks[1].word_count, 30);
    assert_eq!(chunks[1].sentence_count, Some(1));
    assert_eq!(chunks[2].text, "Another short.");
    assert!(chunks.iter().all(|c| c.chunk_type == ChunkingStrategy::Semantic));
}

#[test]
fn semantic_packs_sentences_up_to_budget() {
    let text = "One two three. Four five six.\n\nSeven eight nine. Ten eleven twelve.";
    let chunks = chunk_semantic(text, 6);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "One two three. Four five six.");
    assert_eq!(chunks[0].sentence_count, Some(2));
    assert_eq!(chunks[1].text, "Seven eight nine. Ten eleven twelve.");
}

#[test]
fn hybrid_never_exceeds_budget() {
    let text = format!(
        "Short one. {}\n\n{} Another short.",
        long_sentence(30),
        long_sentence(17)
    );
    let chunks = chunk_hybrid(&text, 10, 2);
    assert!(chunks.iter().all(|c| c.word_count <= 10));
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.chunk_id, i);
        assert_eq!(c.chunk_type, ChunkingStrategy::Hybrid);
    }
    assert_eq!(chunks[0].text, "Short one.");
    assert_eq!(chunks[0].parent_semantic_chunk_id, None);
    let from_long: Vec<_> = chunks
        .iter()
        .filter(|c| c.parent_semantic_chunk_id == Some(1))
        .collect();
    assert_eq!(from_long.len(), 4);
    assert_eq!(chunks.last().unwrap().text, "Another short.");
}

#[test]
fn hybrid_without_overlap_rebuilds_the_text() {
    let text = format!(
        "Short one. Second short sentence here. {} Another short.",
        long_sentence(30)
    );
    let chunks = chunk_hybrid(&text, 10, 0);
    assert!(chunks.len() > 3);
    assert!(chunks.iter().any(|c| c.parent_semantic_chunk_id.is_some()));
    let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
    assert_eq!(joined, text);
}

#[test]
fn chunk_text_dispatches_on_strategy() {
    let text = numbered_words(50);
    let params = ChunkParams::new(ChunkingStrategy::FixedSize, 20, 5).unwrap();
    let chunks = chunk_text(&text, &params);
    assert!(chunks.iter().all(|c| c.chunk_type == ChunkingStrategy::FixedSize));
    assert_eq!(chunks.len(), 3);
}

#[test]
fn params_are_validated() {
    assert!(ChunkParams::new(ChunkingStrategy::Hybrid, 0, 0).is_err());
    assert!(ChunkParams::new(ChunkingStrategy::Hybrid, 100, 100).is_err());
    assert!(ChunkParams::new(ChunkingStrategy::Hybrid, 100, 150).is_err());
    assert!(ChunkParams::new(ChunkingStrategy::Semantic, 100, 99).is_ok());
}

#[test]
fn strategy_names_round_trip() {
    for s in [
        ChunkingStrategy::FixedSize,
        ChunkingStrategy::Semantic,
        ChunkingStrategy::Hybrid,
    ] {
        assert_eq!(s.as_str().parse::<ChunkingStrategy>().unwrap(), s);
    }
    assert!("paragraph".parse::<ChunkingStrategy>().is_err());
}

#[test]
fn sentence_boundaries() {
    assert_eq!(
        split_sentences("Dr. smith went home. He slept! Did he? 3 times."),
        vec!["Dr. smith went home.", "He slept!", "Did he?", "3 times."]
    );
    assert_eq!(
        split_sentences("The limit is 2.5 million, \"per claim.\" Next one"),
        vec!["The limit is 2.5 million, \"per claim.\"", "Next one"]
    );
}
